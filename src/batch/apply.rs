//! # 目录批量变换
//!
//! 遍历输入目录树，对每个匹配的图像调用变换函数，
//! 结果统一编码为 PNG，平铺写入输出目录（只保留文件名主干）。
//!
//! ## 错误策略
//! - 解码失败 / 无效图像：记录并跳过，批次继续
//! - 其他错误（归一化失败、写入失败、目录创建失败）：中止批次并返回
//!
//! ## 依赖关系
//! - 被 `commands/normalize.rs`, `commands/convert.rs` 调用
//! - 使用 `batch/collector.rs`, `batch/runner.rs`, `codec/`

use super::collector::{FileCollector, IMAGE_PATTERNS};
use super::runner::{BatchResult, BatchRunner, ProcessResult};
use crate::codec;
use crate::error::{HistoprepError, Result};
use crate::models::Tile;

use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 批量变换配置
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 逗号分隔的文件名模式
    pub patterns: String,
    /// 进度条标签
    pub label: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            patterns: IMAGE_PATTERNS.to_string(),
            label: "Processing".to_string(),
        }
    }
}

/// 确保输入目录存在、创建输出目录
pub(crate) fn prepare_dirs(input_root: &Path, output_root: &Path) -> Result<()> {
    if !input_root.exists() {
        return Err(HistoprepError::DirectoryNotFound {
            path: input_root.display().to_string(),
        });
    }

    fs::create_dir_all(output_root).map_err(|e| HistoprepError::FileWriteError {
        path: output_root.display().to_string(),
        source: e,
    })
}

/// 对目录树中的每个图像应用变换并写出 PNG
pub fn run_batch<F>(
    mut transform: F,
    input_root: &Path,
    output_root: &Path,
    options: &BatchOptions,
) -> Result<BatchResult>
where
    F: FnMut(Tile) -> Result<Tile>,
{
    prepare_dirs(input_root, output_root)?;

    let files = FileCollector::new(input_root)
        .with_pattern(&options.patterns)?
        .collect();
    debug!(
        "{} image(s) matching '{}' under {}",
        files.len(),
        options.patterns,
        input_root.display()
    );

    // 输出路径 -> 写入它的输入文件，用于检测文件名冲突
    let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

    BatchRunner::new(&options.label).run(&files, |input| {
        let tile = match codec::decode_tile(input) {
            Ok(tile) => tile,
            Err(e) => return Ok(ProcessResult::Failed(input.display().to_string(), e.to_string())),
        };

        let processed = match transform(tile) {
            Ok(processed) => processed,
            Err(e) if e.is_invalid_image() => {
                return Ok(ProcessResult::Failed(
                    input.display().to_string(),
                    e.with_file("file", input).to_string(),
                ))
            }
            Err(e) => return Err(e.with_file("file", input)),
        };

        let output_path = codec::output_path_for(input, output_root);
        if let Some(previous) = written.insert(output_path.clone(), input.to_path_buf()) {
            warn!(
                "{} overwrites output of {} ({})",
                input.display(),
                previous.display(),
                output_path.display()
            );
        }

        codec::write_png(&processed, &output_path)?;
        Ok(ProcessResult::Success(format!(
            "{} -> {}",
            input.display(),
            output_path.display()
        )))
    })
}
