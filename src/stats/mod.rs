//! # 数据集统计模块
//!
//! ## 子模块
//! - `representative`: 代表性图像选择
//!
//! ## 依赖关系
//! - 被 `commands/representative.rs` 使用

pub mod representative;

pub use representative::{find_representative, write_stats_csv, Selection, SelectionMode};
