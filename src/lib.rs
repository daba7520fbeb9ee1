//! # histoprep - 病理切片图像批量预处理工具
//!
//! 对目录树中的 H&E 染色切片图块做批量预处理。
//!
//! ## 功能
//! - `stain` - 以参考图像为目标做染色归一化 (Macenko, Vahadane, Reinhard)
//! - `batch` - 目录批量变换、PNG 重新编码、JSON 元数据复制
//! - `stats` - 选择最接近数据集均值的图像
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (目录批量处理)
//!   │     ├── stain/     (染色归一化算法)
//!   │     ├── stats/     (数据集统计)
//!   │     ├── codec/     (图像解码与写出)
//!   │     └── models/    (图像数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod error;
pub mod models;
pub mod stain;
pub mod stats;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use error::{HistoprepError, Result};
pub use models::{ChannelOrder, ColorTile, Tile};
pub use stain::{normalize, BoundNormalizer, StainMethod};
