//! # 批量处理模块
//!
//! 提供统一的目录批量处理能力。
//!
//! ## 功能
//! - 收集匹配文件列表（递归、大小写不敏感）
//! - 顺序处理，单文件失败跳过
//! - 图像变换并写出 PNG
//! - 元数据文件复制
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被各命令模块使用
//! - 使用 `indicatif` 显示进度

pub mod apply;
pub mod collector;
pub mod runner;
pub mod sidecar;

pub use apply::{run_batch, BatchOptions};
pub use collector::{FileCollector, IMAGE_PATTERNS, SIDECAR_PATTERNS};
pub use runner::{BatchResult, BatchRunner, ProcessResult};
pub use sidecar::copy_sidecars;
