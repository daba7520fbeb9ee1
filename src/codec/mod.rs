//! # 图像编解码模块
//!
//! 封装 `image` crate 的读写能力。
//!
//! ## 功能
//! - 按内容探测格式解码（8 位 PNG / JPEG）
//! - 灰度解码（用于强度统计，Rec.601 加权）
//! - PNG 编码，先写临时文件再重命名，失败时不留下半截文件
//!
//! ## 依赖关系
//! - 被 `stain/`, `batch/`, `stats/` 使用
//! - 使用 `models/tile.rs`

use crate::error::{HistoprepError, Result};
use crate::models::Tile;

use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// 输出文件的固定扩展名
pub const OUTPUT_EXTENSION: &str = "png";

/// 读取并解码图像
fn decode_dynamic(path: &Path) -> Result<DynamicImage> {
    let context = path.display().to_string();

    let reader = ImageReader::open(path)
        .map_err(|e| HistoprepError::invalid_image(&context, e.to_string()))?
        .with_guessed_format()
        .map_err(|e| HistoprepError::invalid_image(&context, e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| HistoprepError::invalid_image(&context, e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(HistoprepError::invalid_image(&context, "zero-sized image"));
    }

    Ok(img)
}

/// 解码为切片（灰度或彩色，彩色为 RGB 顺序）
pub fn decode_tile(path: &Path) -> Result<Tile> {
    decode_dynamic(path).map(Tile::from_dynamic)
}

/// Rec.601 灰度，14 位定点系数，与 OpenCV 的 `IMREAD_GRAYSCALE` 相同
pub fn rec601_luma(px: [u8; 3]) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    let [r, g, b] = px.map(u32::from);
    ((r * R + g * G + b * B + (1 << 13)) >> 14) as u8
}

/// 解码并转换为 8 位灰度（彩色图像按 Rec.601 加权）
pub fn decode_gray(path: &Path) -> Result<GrayImage> {
    Ok(match Tile::from_dynamic(decode_dynamic(path)?) {
        Tile::Gray(gray) => gray,
        Tile::Color(color) => {
            let rgb = color.to_rgb_image();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                Luma([rec601_luma(rgb.get_pixel(x, y).0)])
            })
        }
    })
}

/// 构造输出路径：`<output_dir>/<stem>.png`，文件名不要求是 UTF-8
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("image"));
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    output_dir.join(name)
}

/// 编码为 PNG 并原子地写入目标路径
pub fn write_png(tile: &Tile, output_path: &Path) -> Result<()> {
    let mut temp_name = OsString::from(".");
    temp_name.push(output_path.file_name().unwrap_or_else(|| OsStr::new("output.png")));
    temp_name.push(".partial");
    let temp_path = output_path.with_file_name(temp_name);

    if let Err(e) = tile
        .to_dynamic()
        .save_with_format(&temp_path, ImageFormat::Png)
    {
        let _ = fs::remove_file(&temp_path);
        return Err(HistoprepError::ImageEncodeError {
            path: output_path.display().to_string(),
            source: e,
        });
    }

    fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        HistoprepError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        }
    })
}
