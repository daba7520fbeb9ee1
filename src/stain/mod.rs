//! # 染色归一化模块
//!
//! 三种方法（Vahadane / Reinhard / Macenko）共享同一接口：
//! 先在参考图像上 `fit`，再对源图像 `transform`。
//!
//! ## 子模块
//! - `color`: sRGB <-> L*a*b*
//! - `density`: 光密度、组织掩膜、浓度求解
//! - `deconvolution`: 基于染色矩阵的归一化（Macenko / Vahadane 共用）
//! - `macenko`, `vahadane`: 染色矩阵估计器
//! - `reinhard`: Lab 均值/方差迁移
//!
//! ## 通道顺序
//! 归一化器只接受 RGB 顺序的 `RgbImage`；`normalize` 与 `BoundNormalizer`
//! 负责把任意顺序的 `ColorTile` 转为 RGB，结果再转回源切片的顺序。
//!
//! ## 依赖关系
//! - 被 `commands/normalize.rs` 使用
//! - 使用 `models/tile.rs`, `codec/`

pub mod color;
pub mod deconvolution;
pub mod density;
pub mod macenko;
pub mod reinhard;
pub mod vahadane;

use crate::codec;
use crate::error::{HistoprepError, Result};
use crate::models::{ColorTile, Tile};

use clap::ValueEnum;
use image::RgbImage;
use log::debug;
use std::path::{Path, PathBuf};

pub use deconvolution::StainMatrixNormalizer;
pub use macenko::MacenkoExtractor;
pub use reinhard::ReinhardNormalizer;
pub use vahadane::VahadaneExtractor;

/// 染色归一化方法
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum StainMethod {
    /// Sparse non-negative stain separation (Vahadane et al.)
    Vahadane,
    /// Lab mean/std color transfer (Reinhard et al.)
    Reinhard,
    /// OD-plane angular stain separation (Macenko et al.)
    #[default]
    Macenko,
}

impl std::fmt::Display for StainMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StainMethod::Vahadane => write!(f, "vahadane"),
            StainMethod::Reinhard => write!(f, "reinhard"),
            StainMethod::Macenko => write!(f, "macenko"),
        }
    }
}

impl StainMethod {
    /// 创建未拟合的归一化器
    pub fn normalizer(self) -> Box<dyn StainNormalizer> {
        match self {
            StainMethod::Vahadane => {
                Box::new(StainMatrixNormalizer::new(VahadaneExtractor::default()))
            }
            StainMethod::Reinhard => Box::new(ReinhardNormalizer::new()),
            StainMethod::Macenko => {
                Box::new(StainMatrixNormalizer::new(MacenkoExtractor::default()))
            }
        }
    }
}

/// 染色归一化器
///
/// `fit` 会改写内部统计量，因此同一实例不能在未同步的情况下跨线程共享。
pub trait StainNormalizer {
    fn method(&self) -> StainMethod;

    /// 在参考图像上拟合目标统计量
    fn fit(&mut self, reference: &RgbImage) -> Result<()>;

    /// 将源图像变换到参考图像的染色外观
    fn transform(&self, source: &RgbImage) -> Result<RgbImage>;
}

/// 校验并取出非空彩色切片
fn color_input<'a>(tile: &'a Tile, role: &str) -> Result<&'a ColorTile> {
    let color = match tile {
        Tile::Color(color) => color,
        Tile::Gray(_) => {
            return Err(HistoprepError::invalid_image(
                role,
                "expected a 3-channel color image, got grayscale",
            ))
        }
    };
    if color.is_empty() {
        return Err(HistoprepError::invalid_image(role, "zero-sized image"));
    }
    Ok(color)
}

/// 用已拟合的归一化器变换切片，保持源切片的通道顺序
fn apply(normalizer: &dyn StainNormalizer, source: &ColorTile) -> Result<ColorTile> {
    let out = normalizer.transform(&source.to_rgb_image())?;
    Ok(ColorTile::from_rgb_image(out).into_order(source.order()))
}

/// 一次性归一化：在 `reference` 上拟合，再变换 `source`
pub fn normalize(method: StainMethod, source: &Tile, reference: &Tile) -> Result<Tile> {
    let source = color_input(source, "source image")?;
    let reference = color_input(reference, "reference image")?;

    let mut normalizer = method.normalizer();
    normalizer.fit(&reference.to_rgb_image())?;
    apply(normalizer.as_ref(), source).map(Tile::Color)
}

/// 绑定到某个参考图像的已拟合归一化器
///
/// 整个批次只读取并拟合一次参考图像。
pub struct BoundNormalizer {
    normalizer: Box<dyn StainNormalizer>,
    reference: PathBuf,
}

impl BoundNormalizer {
    /// 在内存中的参考切片上拟合
    pub fn fit(method: StainMethod, reference: &Tile) -> Result<Self> {
        let reference = color_input(reference, "reference image")?;
        let mut normalizer = method.normalizer();
        normalizer.fit(&reference.to_rgb_image())?;
        Ok(Self {
            normalizer,
            reference: PathBuf::new(),
        })
    }

    /// 读取参考图像文件并拟合
    pub fn from_reference_path(method: StainMethod, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(HistoprepError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let tile = codec::decode_tile(path)?;
        let mut bound = Self::fit(method, &tile).map_err(|e| e.with_file("reference", path))?;
        bound.reference = path.to_path_buf();

        debug!("fitted {} normalizer on {}", method, path.display());
        Ok(bound)
    }

    pub fn method(&self) -> StainMethod {
        self.normalizer.method()
    }

    pub fn reference(&self) -> &Path {
        &self.reference
    }

    /// 归一化单个切片
    pub fn normalize(&self, tile: &Tile) -> Result<Tile> {
        let source = color_input(tile, "source image")?;
        apply(self.normalizer.as_ref(), source).map(Tile::Color)
    }
}
