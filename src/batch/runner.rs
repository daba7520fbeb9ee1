//! # 批量执行器
//!
//! 顺序执行批量处理任务。
//!
//! ## 功能
//! - 逐文件处理，单线程、同步
//! - 进度条显示
//! - 单文件失败记录后继续；处理器返回 `Err` 时立即中止整个批次
//!
//! ## 依赖关系
//! - 被 `batch/apply.rs`, `batch/sidecar.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 跳过的文件通过 `log::warn!` 逐条记录

use crate::error::Result;
use crate::utils::progress;

use log::{debug, warn};
use std::path::{Path, PathBuf};

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 处理失败，已跳过
    Failed(String, String), // (文件路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 进度条标签
    label: String,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }

    /// 顺序处理文件列表
    pub fn run<F>(&self, files: &[PathBuf], mut processor: F) -> Result<BatchResult>
    where
        F: FnMut(&Path) -> Result<ProcessResult>,
    {
        let pb = progress::create_progress_bar(files.len() as u64, &self.label);
        let mut batch_result = BatchResult::default();

        for file in files {
            let result = match processor(file) {
                Ok(result) => result,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            };

            match &result {
                ProcessResult::Success(msg) => debug!("{}", msg),
                ProcessResult::Failed(path, err) => {
                    pb.suspend(|| warn!("Skipping {}: {}", path, err));
                }
            }

            batch_result.merge(result);
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HistoprepError;

    #[test]
    fn test_failures_are_collected() {
        let files: Vec<PathBuf> = ["a", "b", "c"].iter().map(PathBuf::from).collect();
        let result = BatchRunner::new("test")
            .run(&files, |f| {
                let name = f.display().to_string();
                Ok(if name == "b" {
                    ProcessResult::Failed(name, "bad".to_string())
                } else {
                    ProcessResult::Success(name)
                })
            })
            .unwrap();

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total(), 3);
        assert_eq!(result.failures, vec![("b".to_string(), "bad".to_string())]);
    }

    #[test]
    fn test_error_aborts_remaining_files() {
        let files: Vec<PathBuf> = ["a", "b", "c"].iter().map(PathBuf::from).collect();
        let mut visited = Vec::new();
        let err = BatchRunner::new("test")
            .run(&files, |f| {
                visited.push(f.to_path_buf());
                if f == Path::new("b") {
                    Err(HistoprepError::Other("boom".to_string()))
                } else {
                    Ok(ProcessResult::Success(f.display().to_string()))
                }
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(visited.len(), 2);
    }
}
