//! # Macenko 染色矩阵估计
//!
//! 在组织像素的 OD 协方差的前两个主方向张成的平面内，
//! 取投影角度的 1% / 99% 分位方向作为两种染料的向量。
//!
//! ## 依赖关系
//! - 被 `stain/deconvolution.rs` 通过 `StainExtractor` 使用
//! - 使用 `stain/density.rs`
//! - 使用 `nalgebra::SymmetricEigen`

use super::deconvolution::{order_hematoxylin_first, StainExtractor};
use super::density;
use super::StainMethod;
use crate::error::{HistoprepError, Result};

use image::RgbImage;
use log::debug;
use nalgebra::{Matrix2x3, SymmetricEigen, Vector2, Vector3};

/// Macenko 估计器
#[derive(Debug, Clone)]
pub struct MacenkoExtractor {
    /// 角度分位数 (默认 99)
    pub angular_percentile: f64,
    /// OD 总和低于此值的像素视为透明而丢弃
    pub beta: f64,
}

impl Default for MacenkoExtractor {
    fn default() -> Self {
        Self {
            angular_percentile: 99.0,
            beta: 0.15,
        }
    }
}

impl StainExtractor for MacenkoExtractor {
    fn method(&self) -> StainMethod {
        StainMethod::Macenko
    }

    fn stain_matrix(&self, img: &RgbImage) -> Result<Matrix2x3<f64>> {
        let method = self.method();
        let mut od = density::tissue_density(img, method)?;
        od.retain(|v| v.sum() >= self.beta);
        if od.len() < density::MIN_TISSUE_PIXELS {
            return Err(HistoprepError::normalization(
                method,
                format!("too few tissue pixels above OD {}", self.beta),
            ));
        }

        let eig = SymmetricEigen::new(density::covariance(&od));

        // 按特征值降序取前两个特征向量
        let mut idx = [0usize, 1, 2];
        idx.sort_by(|&a, &b| {
            eig.eigenvalues[b]
                .partial_cmp(&eig.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let second = eig.eigenvalues[idx[1]];
        if second.is_nan() || second <= 0.0 {
            return Err(HistoprepError::normalization(
                method,
                "stain OD does not span a plane",
            ));
        }

        let mut v0: Vector3<f64> = eig.eigenvectors.column(idx[0]).into_owned();
        let mut v1: Vector3<f64> = eig.eigenvectors.column(idx[1]).into_owned();
        if v0[0] < 0.0 {
            v0 = -v0;
        }
        if v1[0] < 0.0 {
            v1 = -v1;
        }

        let phi: Vec<f64> = od.iter().map(|v| v.dot(&v1).atan2(v.dot(&v0))).collect();
        let min_phi = density::percentile(&phi, 100.0 - self.angular_percentile);
        let max_phi = density::percentile(&phi, self.angular_percentile);
        debug!(
            "macenko: {} tissue pixels, angle range [{:.4}, {:.4}]",
            od.len(),
            min_phi,
            max_phi
        );

        let direction = |angle: f64| -> Vector3<f64> {
            let p = Vector2::new(angle.cos(), angle.sin());
            v0 * p[0] + v1 * p[1]
        };
        let stains = order_hematoxylin_first(direction(min_phi), direction(max_phi));

        density::normalize_rows(stains)
            .ok_or_else(|| HistoprepError::normalization(method, "zero-length stain vector"))
    }
}
