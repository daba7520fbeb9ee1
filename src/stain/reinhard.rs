//! # Reinhard 颜色迁移
//!
//! 在 L*a*b* 空间逐通道匹配均值与标准差。

use super::color::{lab_to_rgb, rgb_to_lab};
use super::{StainMethod, StainNormalizer};
use crate::error::{HistoprepError, Result};

use image::RgbImage;

/// 标准差低于此值时只做平移
const MIN_STD: f64 = 1e-6;

/// 每个 Lab 通道的均值与标准差
#[derive(Debug, Clone, Copy, PartialEq)]
struct LabStats {
    mean: [f64; 3],
    std: [f64; 3],
}

impl LabStats {
    fn from_lab(lab: &[[f64; 3]]) -> Self {
        let n = lab.len().max(1) as f64;
        let mut mean = [0.0; 3];
        for px in lab {
            for c in 0..3 {
                mean[c] += px[c];
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = [0.0; 3];
        for px in lab {
            for c in 0..3 {
                var[c] += (px[c] - mean[c]).powi(2);
            }
        }
        let std = var.map(|v| (v / n).sqrt());

        Self { mean, std }
    }
}

fn to_lab(img: &RgbImage) -> Vec<[f64; 3]> {
    img.pixels().map(|p| rgb_to_lab(p.0)).collect()
}

/// Reinhard 归一化器
#[derive(Debug, Default)]
pub struct ReinhardNormalizer {
    target: Option<LabStats>,
}

impl ReinhardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StainNormalizer for ReinhardNormalizer {
    fn method(&self) -> StainMethod {
        StainMethod::Reinhard
    }

    fn fit(&mut self, reference: &RgbImage) -> Result<()> {
        let stats = LabStats::from_lab(&to_lab(reference));
        if stats.mean.iter().chain(&stats.std).any(|v| !v.is_finite()) {
            return Err(HistoprepError::normalization(
                self.method(),
                "non-finite Lab statistics",
            ));
        }
        self.target = Some(stats);
        Ok(())
    }

    fn transform(&self, source: &RgbImage) -> Result<RgbImage> {
        let target = self.target.ok_or_else(|| {
            HistoprepError::normalization(self.method(), "normalizer used before fit")
        })?;

        let lab = to_lab(source);
        let stats = LabStats::from_lab(&lab);

        let mut out = RgbImage::new(source.width(), source.height());
        for (px, l) in out.pixels_mut().zip(&lab) {
            let mut mapped = [0.0; 3];
            for c in 0..3 {
                let centered = l[c] - stats.mean[c];
                mapped[c] = if stats.std[c] < MIN_STD {
                    centered + target.mean[c]
                } else {
                    centered / stats.std[c] * target.std[c] + target.mean[c]
                };
            }
            px.0 = lab_to_rgb(mapped);
        }
        Ok(out)
    }
}
