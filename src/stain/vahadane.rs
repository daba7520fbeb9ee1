//! # Vahadane 染色矩阵估计
//!
//! 稀疏非负字典学习：将组织像素的 OD 矩阵 V (n×3) 分解为
//! 非负浓度 C (n×2) 与非负字典 W (2×3)，对 C 施加 L1 惩罚。
//!
//! 使用乘法更新规则，以标准 H&E 向量初始化，
//! 在确定性的等间隔子样本上迭代固定轮数，结果可复现。
//!
//! ## 依赖关系
//! - 被 `stain/deconvolution.rs` 通过 `StainExtractor` 使用
//! - 使用 `stain/density.rs`
//! - 使用 `nalgebra`

use super::deconvolution::{order_hematoxylin_first, StainExtractor};
use super::density;
use super::StainMethod;
use crate::error::{HistoprepError, Result};

use image::RgbImage;
use log::debug;
use nalgebra::{Matrix2, Matrix2x3, Vector2, Vector3};

/// Ruifrok & Johnston 的 H&E OD 向量，作为字典初值
const HEMATOXYLIN_INIT: [f64; 3] = [0.65, 0.70, 0.29];
const EOSIN_INIT: [f64; 3] = [0.07, 0.99, 0.11];

const EPS: f64 = 1e-10;

/// Vahadane 估计器
#[derive(Debug, Clone)]
pub struct VahadaneExtractor {
    /// 浓度的 L1 正则化系数
    pub regularizer: f64,
    /// 迭代轮数
    pub iterations: usize,
    /// 参与学习的最大像素数
    pub max_samples: usize,
}

impl Default for VahadaneExtractor {
    fn default() -> Self {
        Self {
            regularizer: 0.1,
            iterations: 100,
            max_samples: 20_000,
        }
    }
}

impl VahadaneExtractor {
    /// 确定性子采样
    fn subsample(&self, od: Vec<Vector3<f64>>) -> Vec<Vector3<f64>> {
        if od.len() <= self.max_samples {
            return od;
        }
        let stride = od.len().div_ceil(self.max_samples);
        od.into_iter().step_by(stride).collect()
    }

    /// 乘法更新求解非负稀疏分解，返回字典 W
    fn learn_dictionary(&self, od: &[Vector3<f64>]) -> Matrix2x3<f64> {
        let mut w = Matrix2x3::from_rows(&[
            Vector3::from(HEMATOXYLIN_INIT).normalize().transpose(),
            Vector3::from(EOSIN_INIT).normalize().transpose(),
        ]);

        // 以截断最小二乘解初始化浓度；乘法更新无法离开 0，故加下限
        let mut conc: Vec<Vector2<f64>> = density::concentrations(od, &w)
            .unwrap_or_else(|| vec![Vector2::repeat(0.1); od.len()])
            .into_iter()
            .map(|c| c.map(|v| v.max(1e-3)))
            .collect();

        let lambda = Vector2::repeat(self.regularizer);

        for _ in 0..self.iterations {
            // C <- C ∘ (V Wᵀ) / (C W Wᵀ + λ)
            let wwt: Matrix2<f64> = w * w.transpose();
            for (c, v) in conc.iter_mut().zip(od) {
                let numer = w * v;
                let denom = wwt * *c + lambda;
                *c = c.component_mul(&numer.component_div(&denom.map(|d| d.max(EPS))));
            }

            // W <- W ∘ (Cᵀ V) / (Cᵀ C W)
            let mut ctv = Matrix2x3::zeros();
            let mut ctc = Matrix2::zeros();
            for (c, v) in conc.iter().zip(od) {
                ctv += c * v.transpose();
                ctc += c * c.transpose();
            }
            let denom = (ctc * w).map(|d| d.max(EPS));
            w = w.component_mul(&ctv.component_div(&denom));

            // 字典行单位化，并把尺度转移到浓度上
            for r in 0..2 {
                let norm = w.row(r).norm();
                if norm > EPS {
                    let unit = w.row(r) / norm;
                    w.set_row(r, &unit);
                    for c in conc.iter_mut() {
                        c[r] *= norm;
                    }
                }
            }
        }

        w
    }
}

impl StainExtractor for VahadaneExtractor {
    fn method(&self) -> StainMethod {
        StainMethod::Vahadane
    }

    fn stain_matrix(&self, img: &RgbImage) -> Result<Matrix2x3<f64>> {
        let method = self.method();
        let od = self.subsample(density::tissue_density(img, method)?);
        debug!("vahadane: learning dictionary on {} pixels", od.len());

        let w = self.learn_dictionary(&od);
        if w.iter().any(|v| !v.is_finite()) {
            return Err(HistoprepError::normalization(
                method,
                "dictionary learning diverged",
            ));
        }

        let stains = order_hematoxylin_first(w.row(0).transpose(), w.row(1).transpose());
        let stains = density::normalize_rows(stains)
            .ok_or_else(|| HistoprepError::normalization(method, "zero-length stain vector"))?;

        // 两个原子退化为同一方向时无法分离染料
        if stains.row(0).dot(&stains.row(1)) > 1.0 - 1e-6 {
            return Err(HistoprepError::normalization(
                method,
                "stain atoms collapsed to a single direction",
            ));
        }

        Ok(stains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::synthetic_he_tile;

    #[test]
    fn test_dictionary_is_nonnegative_and_ordered() {
        let img = synthetic_he_tile(64, 64, 1.0, 0.8);
        let w = VahadaneExtractor::default().stain_matrix(&img).unwrap();

        assert!(w.iter().all(|&v| v >= 0.0));
        assert!(w[(0, 0)] > w[(1, 0)], "hematoxylin row has the larger red OD");
        for r in 0..2 {
            assert!((w.row(r).norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_subsample_is_bounded_and_deterministic() {
        let extractor = VahadaneExtractor {
            max_samples: 100,
            ..Default::default()
        };
        let od: Vec<Vector3<f64>> = (0..1000)
            .map(|i| Vector3::new(i as f64, 0.0, 0.0))
            .collect();
        let a = extractor.subsample(od.clone());
        let b = extractor.subsample(od);
        assert!(a.len() <= 100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_white_image_fails() {
        let img = RgbImage::from_pixel(32, 32, image::Rgb([255, 255, 255]));
        assert!(VahadaneExtractor::default().stain_matrix(&img).is_err());
    }
}
