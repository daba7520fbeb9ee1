//! # 统一错误处理模块
//!
//! 定义 histoprep 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 图像错误：无法解码、空图像、通道数不符
//! - 归一化错误：染色归一化算法无法拟合或变换
//! - 数据集错误：目录中没有可解码的图像
//! - I/O 错误：文件读写、复制失败
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// histoprep 统一错误类型
#[derive(Error, Debug)]
pub enum HistoprepError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode image: {path}")]
    ImageEncodeError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 图像错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid image: {context}\nReason: {reason}")]
    InvalidImage { context: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 染色归一化错误
    // ─────────────────────────────────────────────────────────────
    #[error("Stain normalization failed ({method})\nReason: {reason}")]
    Normalization { method: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 数据集错误
    // ─────────────────────────────────────────────────────────────
    #[error("No decodable images found under: {path}")]
    EmptyDataset { path: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl HistoprepError {
    /// 构造图像错误
    pub fn invalid_image(context: impl Into<String>, reason: impl Into<String>) -> Self {
        HistoprepError::InvalidImage {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// 构造归一化错误
    pub fn normalization(method: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        HistoprepError::Normalization {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// 是否为单文件可跳过的图像错误
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, HistoprepError::InvalidImage { .. })
    }

    /// 为不带路径的错误附加文件信息
    pub fn with_file(self, label: &str, path: &std::path::Path) -> Self {
        match self {
            HistoprepError::Normalization { method, reason } => HistoprepError::Normalization {
                method,
                reason: format!("{} ({}: {})", reason, label, path.display()),
            },
            HistoprepError::InvalidImage { reason, .. } => HistoprepError::InvalidImage {
                context: path.display().to_string(),
                reason,
            },
            HistoprepError::Other(msg) => {
                HistoprepError::Other(format!("{} ({}: {})", msg, label, path.display()))
            }
            other => other,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HistoprepError>;
