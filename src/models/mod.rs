//! # 数据模型模块
//!
//! 定义内存中的图像切片表示。
//!
//! ## 依赖关系
//! - 被 `codec/`, `stain/`, `batch/`, `stats/` 使用
//! - 子模块: tile

pub mod tile;

pub use tile::{ChannelOrder, ColorTile, Tile};
