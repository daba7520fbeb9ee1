//! # 图像切片数据模型
//!
//! 统一表示灰度 (H×W) 与彩色 (H×W×3, 交错存储) 的 8 位图像。
//!
//! 彩色切片显式携带通道顺序 (`Rgb` / `Bgr`)，调用方不再需要
//! 自行记录颜色顺序；跨越归一化边界时由类型本身保证一致。
//!
//! ## 依赖关系
//! - 被 `codec/`, `stain/`, `batch/`, `stats/` 使用
//! - 使用 `image` crate 的缓冲区类型

use crate::error::{HistoprepError, Result};

use image::{DynamicImage, GrayImage, RgbImage};

/// 彩色通道交错顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelOrder::Rgb => write!(f, "RGB"),
            ChannelOrder::Bgr => write!(f, "BGR"),
        }
    }
}

/// 彩色切片
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTile {
    width: u32,
    height: u32,
    order: ChannelOrder,
    /// 交错像素数据，长度为 width * height * 3
    data: Vec<u8>,
}

impl ColorTile {
    /// 从原始交错数据创建
    pub fn new(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(HistoprepError::invalid_image(
                format!("{}x{} {} buffer", width, height, order),
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            order,
            data,
        })
    }

    /// 从 `image` 的 RGB 缓冲区创建（顺序为 RGB）
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            order: ChannelOrder::Rgb,
            data: img.into_raw(),
        }
    }

    /// 转换为 RGB 顺序的 `image` 缓冲区
    pub fn to_rgb_image(&self) -> RgbImage {
        let data = match self.order {
            ChannelOrder::Rgb => self.data.clone(),
            ChannelOrder::Bgr => swap_red_blue(&self.data),
        };
        // 长度已在构造时校验
        RgbImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    /// 转换到指定通道顺序
    pub fn into_order(self, order: ChannelOrder) -> Self {
        if self.order == order {
            return self;
        }
        Self {
            data: swap_red_blue(&self.data),
            order,
            ..self
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 每个通道的均值，按 R, G, B 顺序返回
    pub fn rgb_means(&self) -> [f64; 3] {
        let n = (self.width as usize * self.height as usize).max(1) as f64;
        let mut sums = [0.0f64; 3];
        for px in self.data.chunks_exact(3) {
            for (s, &v) in sums.iter_mut().zip(px) {
                *s += v as f64;
            }
        }
        let means = [sums[0] / n, sums[1] / n, sums[2] / n];
        match self.order {
            ChannelOrder::Rgb => means,
            ChannelOrder::Bgr => [means[2], means[1], means[0]],
        }
    }
}

fn swap_red_blue(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(3) {
        out.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    out
}

/// 内存中的图像切片
#[derive(Debug, Clone, PartialEq)]
pub enum Tile {
    Gray(GrayImage),
    Color(ColorTile),
}

impl Tile {
    /// 从解码结果创建：单通道（含 alpha）为灰度，其余转为 RGB
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Tile::Gray(gray),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => Tile::Gray(img.to_luma8()),
            DynamicImage::ImageRgb8(rgb) => Tile::Color(ColorTile::from_rgb_image(rgb)),
            other => Tile::Color(ColorTile::from_rgb_image(other.to_rgb8())),
        }
    }

    /// 转换为 `image` 的动态图像（彩色总是 RGB 顺序）
    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Tile::Gray(gray) => DynamicImage::ImageLuma8(gray.clone()),
            Tile::Color(color) => DynamicImage::ImageRgb8(color.to_rgb_image()),
        }
    }

    /// (宽, 高)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Tile::Gray(gray) => gray.dimensions(),
            Tile::Color(color) => (color.width(), color.height()),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Tile::Gray(_) => 1,
            Tile::Color(_) => 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        let (w, h) = self.dimensions();
        w == 0 || h == 0
    }

    /// 取出彩色切片，灰度切片返回图像错误
    pub fn into_color(self, context: &str) -> Result<ColorTile> {
        match self {
            Tile::Color(color) => Ok(color),
            Tile::Gray(_) => Err(HistoprepError::invalid_image(
                context,
                "expected a 3-channel color image, got grayscale",
            )),
        }
    }
}
