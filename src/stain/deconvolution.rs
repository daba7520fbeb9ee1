//! # 基于染色矩阵的归一化
//!
//! Macenko 与 Vahadane 共用的拟合 / 变换流程，只在染色矩阵的估计方式上不同：
//!
//! - `fit`: 估计参考图像的染色矩阵，记录每种染料浓度的 99% 分位数
//! - `transform`: 估计源图像自身的染色矩阵与浓度，按分位数比例缩放浓度，
//!   再用参考染色矩阵重建 RGB
//!
//! ## 依赖关系
//! - 被 `stain/mod.rs` 使用
//! - 估计器实现: `stain/macenko.rs`, `stain/vahadane.rs`

use super::density;
use super::{StainMethod, StainNormalizer};
use crate::error::{HistoprepError, Result};

use image::RgbImage;
use nalgebra::{Matrix2x3, Vector2, Vector3};

/// 浓度缩放使用的分位数
const MAX_CONCENTRATION_PERCENTILE: f64 = 99.0;

/// 染色矩阵估计器
///
/// 返回 2×3 矩阵，第 0 行为苏木精，第 1 行为伊红，每行单位长度。
pub trait StainExtractor {
    fn method(&self) -> StainMethod;
    fn stain_matrix(&self, img: &RgbImage) -> Result<Matrix2x3<f64>>;
}

/// 按红色通道 OD 排序：红色 OD 较大的为苏木精
pub fn order_hematoxylin_first(a: Vector3<f64>, b: Vector3<f64>) -> Matrix2x3<f64> {
    let (h, e) = if a[0] >= b[0] { (a, b) } else { (b, a) };
    Matrix2x3::from_rows(&[h.transpose(), e.transpose()])
}

/// 拟合得到的目标统计量
#[derive(Debug, Clone)]
struct FittedTarget {
    stain_matrix: Matrix2x3<f64>,
    max_concentration: Vector2<f64>,
}

/// 染色矩阵归一化器
pub struct StainMatrixNormalizer<E: StainExtractor> {
    extractor: E,
    target: Option<FittedTarget>,
}

impl<E: StainExtractor> StainMatrixNormalizer<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            target: None,
        }
    }

    /// 估计染色矩阵并求解整幅图像的浓度
    fn decompose(&self, img: &RgbImage) -> Result<(Matrix2x3<f64>, Vec<Vector2<f64>>)> {
        let stain_matrix = self.extractor.stain_matrix(img)?;
        let conc = density::concentrations(&density::optical_density(img), &stain_matrix)
            .ok_or_else(|| {
                HistoprepError::normalization(self.extractor.method(), "singular stain matrix")
            })?;
        Ok((stain_matrix, conc))
    }
}

impl<E: StainExtractor> StainNormalizer for StainMatrixNormalizer<E> {
    fn method(&self) -> StainMethod {
        self.extractor.method()
    }

    fn fit(&mut self, reference: &RgbImage) -> Result<()> {
        let (stain_matrix, conc) = self.decompose(reference)?;
        let max_concentration =
            density::concentration_percentile(&conc, MAX_CONCENTRATION_PERCENTILE);

        if max_concentration.iter().any(|&c| !(c.is_finite() && c > 0.0)) {
            return Err(HistoprepError::normalization(
                self.method(),
                "reference has no measurable concentration for one of the stains",
            ));
        }

        self.target = Some(FittedTarget {
            stain_matrix,
            max_concentration,
        });
        Ok(())
    }

    fn transform(&self, source: &RgbImage) -> Result<RgbImage> {
        let target = self.target.as_ref().ok_or_else(|| {
            HistoprepError::normalization(self.method(), "normalizer used before fit")
        })?;

        let (_, conc) = self.decompose(source)?;
        let max_source = density::concentration_percentile(&conc, MAX_CONCENTRATION_PERCENTILE);
        let scale = target
            .max_concentration
            .component_div(&max_source.map(|c| c.max(1e-6)));

        let mut out = RgbImage::new(source.width(), source.height());
        for (px, c) in out.pixels_mut().zip(&conc) {
            let od = target.stain_matrix.transpose() * c.component_mul(&scale);
            px.0 = density::od_to_rgb(&od);
        }
        Ok(out)
    }
}
