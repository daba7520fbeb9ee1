//! # 代表性图像选择
//!
//! 计算每幅图像的统计量（灰度均值，或 RGB 各通道均值），
//! 选出统计量最接近数据集均值的图像：
//! - 灰度：绝对差
//! - 彩色：欧氏距离
//!
//! ## 依赖关系
//! - 被 `commands/representative.rs` 调用
//! - 使用 `batch/` 收集与遍历文件，`codec/` 解码
//! - 使用 `csv` + `serde` 导出统计表

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::codec;
use crate::error::{HistoprepError, Result};
use crate::models::Tile;

use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 统计量类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Mean grayscale intensity, absolute difference
    #[default]
    Gray,
    /// Mean of each color channel, Euclidean distance
    Color,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Gray => write!(f, "gray"),
            SelectionMode::Color => write!(f, "color"),
        }
    }
}

/// 单幅图像的统计量
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageStatistic {
    Gray(f64),
    /// R, G, B
    Color([f64; 3]),
}

impl ImageStatistic {
    /// 到另一统计量的距离；类型不同时为无穷大
    pub fn distance(&self, other: &ImageStatistic) -> f64 {
        match (self, other) {
            (ImageStatistic::Gray(a), ImageStatistic::Gray(b)) => (a - b).abs(),
            (ImageStatistic::Color(a), ImageStatistic::Color(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            _ => f64::INFINITY,
        }
    }

    /// 多个统计量的逐分量均值
    fn mean_of(stats: &[ImageStatistic], mode: SelectionMode) -> ImageStatistic {
        let n = stats.len().max(1) as f64;
        match mode {
            SelectionMode::Gray => ImageStatistic::Gray(
                stats
                    .iter()
                    .map(|s| match s {
                        ImageStatistic::Gray(v) => *v,
                        ImageStatistic::Color(c) => c.iter().sum::<f64>() / 3.0,
                    })
                    .sum::<f64>()
                    / n,
            ),
            SelectionMode::Color => {
                let mut sum = [0.0; 3];
                for s in stats {
                    let c = match s {
                        ImageStatistic::Color(c) => *c,
                        ImageStatistic::Gray(v) => [*v; 3],
                    };
                    for (acc, v) in sum.iter_mut().zip(c) {
                        *acc += v;
                    }
                }
                ImageStatistic::Color(sum.map(|v| v / n))
            }
        }
    }
}

impl std::fmt::Display for ImageStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageStatistic::Gray(v) => write!(f, "{:.2}", v),
            ImageStatistic::Color([r, g, b]) => write!(f, "({:.2}, {:.2}, {:.2})", r, g, b),
        }
    }
}

/// 单幅图像的统计结果
#[derive(Debug, Clone)]
pub struct ImageStats {
    pub file_name: String,
    pub path: PathBuf,
    pub statistic: ImageStatistic,
    /// 到数据集均值的距离
    pub distance: f64,
}

/// 选择结果
#[derive(Debug)]
pub struct Selection {
    pub mode: SelectionMode,
    pub dataset_mean: ImageStatistic,
    /// 按距离升序排列（距离相同保持路径顺序）
    pub ranked: Vec<ImageStats>,
    /// 无法解码而跳过的文件 (路径, 原因)
    pub skipped: Vec<(String, String)>,
}

impl Selection {
    /// 最具代表性的图像
    pub fn best(&self) -> &ImageStats {
        // 构造时保证非空
        &self.ranked[0]
    }
}

/// 计算单幅图像的统计量
pub fn image_statistic(path: &Path, mode: SelectionMode) -> Result<ImageStatistic> {
    match mode {
        SelectionMode::Gray => {
            let gray = codec::decode_gray(path)?;
            let n = gray.as_raw().len().max(1) as f64;
            let sum: f64 = gray.as_raw().iter().map(|&v| v as f64).sum();
            Ok(ImageStatistic::Gray(sum / n))
        }
        SelectionMode::Color => match codec::decode_tile(path)? {
            Tile::Color(color) => Ok(ImageStatistic::Color(color.rgb_means())),
            Tile::Gray(gray) => {
                let n = gray.as_raw().len().max(1) as f64;
                let mean = gray.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
                Ok(ImageStatistic::Color([mean; 3]))
            }
        },
    }
}

/// 在目录中寻找最具代表性的图像
///
/// 灰度统计量按 Rec.601 加权计算。输入目录不存在时返回 `DirectoryNotFound`，
/// 而不是 `EmptyDataset`；目录存在但没有可解码图像时才返回 `EmptyDataset`。
pub fn find_representative(
    input_root: &Path,
    mode: SelectionMode,
    patterns: &str,
) -> Result<Selection> {
    if !input_root.exists() {
        return Err(HistoprepError::DirectoryNotFound {
            path: input_root.display().to_string(),
        });
    }

    let files = FileCollector::new(input_root).with_pattern(patterns)?.collect();

    let mut measured: Vec<(PathBuf, ImageStatistic)> = Vec::with_capacity(files.len());
    let result = BatchRunner::new("Measuring").run(&files, |path| {
        Ok(match image_statistic(path, mode) {
            Ok(stat) => {
                measured.push((path.to_path_buf(), stat));
                ProcessResult::Success(path.display().to_string())
            }
            Err(e) => ProcessResult::Failed(path.display().to_string(), e.to_string()),
        })
    })?;

    if measured.is_empty() {
        return Err(HistoprepError::EmptyDataset {
            path: input_root.display().to_string(),
        });
    }

    let stats: Vec<ImageStatistic> = measured.iter().map(|(_, s)| *s).collect();
    let dataset_mean = ImageStatistic::mean_of(&stats, mode);

    let mut ranked: Vec<ImageStats> = measured
        .into_iter()
        .map(|(path, statistic)| ImageStats {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            distance: statistic.distance(&dataset_mean),
            path,
            statistic,
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Selection {
        mode,
        dataset_mean,
        ranked,
        skipped: result.failures,
    })
}

/// CSV 行
#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    rank: usize,
    file: &'a str,
    path: String,
    mean_gray: Option<f64>,
    mean_r: Option<f64>,
    mean_g: Option<f64>,
    mean_b: Option<f64>,
    distance: f64,
}

/// 导出全部统计量为 CSV
pub fn write_stats_csv(selection: &Selection, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for (i, s) in selection.ranked.iter().enumerate() {
        let (gray, rgb) = match s.statistic {
            ImageStatistic::Gray(v) => (Some(v), None),
            ImageStatistic::Color(c) => (None, Some(c)),
        };
        wtr.serialize(StatsRow {
            rank: i + 1,
            file: &s.file_name,
            path: s.path.display().to_string(),
            mean_gray: gray,
            mean_r: rgb.map(|c| c[0]),
            mean_g: rgb.map(|c| c[1]),
            mean_b: rgb.map(|c| c[2]),
            distance: s.distance,
        })?;
    }

    wtr.flush().map_err(|e| HistoprepError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::IMAGE_PATTERNS;
    use crate::test_utils::{write_gray_png, write_rgb_png, TempDir};
    use std::fs;

    #[test]
    fn test_gray_selects_image_closest_to_mean() {
        let dir = TempDir::new("repr-gray");
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        write_gray_png(&dir.path().join("dark.png"), 10);
        write_gray_png(&dir.path().join("nested/mid.png"), 50);
        write_gray_png(&dir.path().join("light.png"), 90);

        let selection = find_representative(dir.path(), SelectionMode::Gray, IMAGE_PATTERNS).unwrap();
        assert_eq!(selection.best().file_name, "mid.png");
        assert_eq!(selection.dataset_mean, ImageStatistic::Gray(50.0));
        assert_eq!(selection.ranked.len(), 3);
        assert_eq!(selection.best().distance, 0.0);
    }

    #[test]
    fn test_color_uses_euclidean_distance() {
        let dir = TempDir::new("repr-color");
        write_rgb_png(&dir.path().join("red.png"), [200, 40, 40]);
        write_rgb_png(&dir.path().join("blue.png"), [40, 40, 200]);
        write_rgb_png(&dir.path().join("purple.png"), [130, 50, 130]);

        let selection = find_representative(dir.path(), SelectionMode::Color, IMAGE_PATTERNS).unwrap();
        assert_eq!(selection.best().file_name, "purple.png");
        match selection.dataset_mean {
            ImageStatistic::Color(c) => {
                assert!((c[0] - 370.0 / 3.0).abs() < 1e-9);
                assert!((c[1] - 130.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("unexpected statistic {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_files_are_skipped() {
        let dir = TempDir::new("repr-skip");
        write_gray_png(&dir.path().join("a.png"), 20);
        write_gray_png(&dir.path().join("b.png"), 40);
        fs::write(dir.path().join("c.jpg"), b"garbage").unwrap();

        let selection = find_representative(dir.path(), SelectionMode::Gray, IMAGE_PATTERNS).unwrap();
        assert_eq!(selection.ranked.len(), 2);
        assert_eq!(selection.skipped.len(), 1);
        // 距离相同，保留路径顺序
        assert_eq!(selection.best().file_name, "a.png");
    }

    #[test]
    fn test_empty_or_undecodable_dataset() {
        let empty = TempDir::new("repr-empty");
        assert!(matches!(
            find_representative(empty.path(), SelectionMode::Gray, IMAGE_PATTERNS),
            Err(HistoprepError::EmptyDataset { .. })
        ));

        let broken = TempDir::new("repr-broken");
        fs::write(broken.path().join("x.png"), b"nope").unwrap();
        fs::write(broken.path().join("y.jpg"), b"nope").unwrap();
        for mode in [SelectionMode::Gray, SelectionMode::Color] {
            assert!(matches!(
                find_representative(broken.path(), mode, IMAGE_PATTERNS),
                Err(HistoprepError::EmptyDataset { .. })
            ));
        }
    }

    #[test]
    fn test_gray_statistic_of_saturated_color() {
        let dir = TempDir::new("repr-rec601");
        write_rgb_png(&dir.path().join("red.png"), [255, 0, 0]);
        write_rgb_png(&dir.path().join("green.png"), [0, 255, 0]);

        let selection = find_representative(dir.path(), SelectionMode::Gray, IMAGE_PATTERNS).unwrap();
        let by_name = |name: &str| {
            selection
                .ranked
                .iter()
                .find(|s| s.file_name == name)
                .map(|s| s.statistic)
                .unwrap()
        };
        assert_eq!(by_name("red.png"), ImageStatistic::Gray(76.0));
        assert_eq!(by_name("green.png"), ImageStatistic::Gray(150.0));
        assert_eq!(selection.dataset_mean, ImageStatistic::Gray(113.0));
    }

    #[test]
    fn test_missing_root_is_directory_not_found() {
        let dir = TempDir::new("repr-missing");
        assert!(matches!(
            find_representative(&dir.path().join("absent"), SelectionMode::Color, IMAGE_PATTERNS),
            Err(HistoprepError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_stats_csv_has_one_row_per_image() {
        let dir = TempDir::new("repr-csv");
        write_gray_png(&dir.path().join("a.png"), 10);
        write_gray_png(&dir.path().join("b.png"), 30);
        let selection = find_representative(dir.path(), SelectionMode::Gray, IMAGE_PATTERNS).unwrap();

        let csv_path = dir.path().join("stats.csv");
        write_stats_csv(&selection, &csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,file,path,mean_gray"));
    }
}
