//! # 光密度 (OD) 工具
//!
//! Beer-Lambert 光密度空间中的通用运算：
//! - RGB <-> OD 转换
//! - 基于亮度阈值的组织掩膜
//! - 染色浓度的最小二乘求解
//! - numpy 风格（线性插值）的百分位数
//!
//! ## 依赖关系
//! - 被 `stain/macenko.rs`, `stain/vahadane.rs`, `stain/deconvolution.rs` 使用
//! - 使用 `nalgebra`

use super::color;
use super::StainMethod;
use crate::error::{HistoprepError, Result};

use image::RgbImage;
use nalgebra::{Matrix2x3, Vector2, Vector3};

/// 组织掩膜的亮度阈值 (L*/100 低于此值视为组织)
pub const LUMINOSITY_THRESHOLD: f64 = 0.8;

/// 拟合染色矩阵所需的最少组织像素数
pub const MIN_TISSUE_PIXELS: usize = 10;

/// 组织 OD 总方差下限，低于此值视为无染色信号
const MIN_OD_VARIANCE: f64 = 1e-8;

/// OD 下限，避免纯白像素的零值
const MIN_OD: f64 = 1e-6;

/// 单像素 RGB -> OD
pub fn rgb_to_od(px: [u8; 3]) -> Vector3<f64> {
    Vector3::from_fn(|c, _| (-(px[c].max(1) as f64 / 255.0).ln()).max(MIN_OD))
}

/// 单像素 OD -> RGB
pub fn od_to_rgb(od: &Vector3<f64>) -> [u8; 3] {
    let mut px = [0u8; 3];
    for (c, out) in px.iter_mut().enumerate() {
        *out = (255.0 * (-od[c]).exp()).round().clamp(0.0, 255.0) as u8;
    }
    px
}

/// 整幅图像的 OD
pub fn optical_density(img: &RgbImage) -> Vec<Vector3<f64>> {
    img.pixels().map(|p| rgb_to_od(p.0)).collect()
}

/// 组织像素的 OD
///
/// 组织像素为空或没有颜色变化时返回归一化错误。
pub fn tissue_density(img: &RgbImage, method: StainMethod) -> Result<Vec<Vector3<f64>>> {
    let od: Vec<Vector3<f64>> = img
        .pixels()
        .filter(|p| color::luminosity(p.0) < LUMINOSITY_THRESHOLD)
        .map(|p| rgb_to_od(p.0))
        .collect();

    if od.len() < MIN_TISSUE_PIXELS {
        return Err(HistoprepError::normalization(
            method,
            format!(
                "empty tissue mask ({} pixels below luminosity {})",
                od.len(),
                LUMINOSITY_THRESHOLD
            ),
        ));
    }

    let total_variance = covariance(&od).trace();
    if !total_variance.is_finite() || total_variance < MIN_OD_VARIANCE {
        return Err(HistoprepError::normalization(
            method,
            "tissue pixels have no stain variation",
        ));
    }

    Ok(od)
}

/// 样本协方差 (n - 1 归一化)
pub fn covariance(samples: &[Vector3<f64>]) -> nalgebra::Matrix3<f64> {
    let n = samples.len();
    if n < 2 {
        return nalgebra::Matrix3::zeros();
    }
    let mean = samples.iter().fold(Vector3::zeros(), |acc, v| acc + v) / n as f64;
    let mut cov = nalgebra::Matrix3::zeros();
    for v in samples {
        let d = v - mean;
        cov += d * d.transpose();
    }
    cov / (n - 1) as f64
}

/// 染色矩阵行单位化，任一行范数为零时返回 None
pub fn normalize_rows(m: Matrix2x3<f64>) -> Option<Matrix2x3<f64>> {
    let mut out = m;
    for r in 0..2 {
        let norm = m.row(r).norm();
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        let unit = m.row(r) / norm;
        out.set_row(r, &unit);
    }
    Some(out)
}

/// 求解每个像素的染色浓度：min ||od - Wᵀc||，负值截断为 0
///
/// 两个染色向量近乎平行时返回 None。
pub fn concentrations(
    od: &[Vector3<f64>],
    stain_matrix: &Matrix2x3<f64>,
) -> Option<Vec<Vector2<f64>>> {
    let gram = stain_matrix * stain_matrix.transpose();
    let scale = gram[(0, 0)] * gram[(1, 1)];
    if !scale.is_finite() || scale <= 0.0 || gram.determinant() / scale < 1e-6 {
        return None;
    }
    let solve = gram.try_inverse()? * stain_matrix;

    Some(
        od.iter()
            .map(|v| (solve * v).map(|c| c.max(0.0)))
            .collect(),
    )
}

/// 百分位数，q ∈ [0, 100]，线性插值（同 numpy 默认行为）
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 每种染料浓度的百分位数
pub fn concentration_percentile(conc: &[Vector2<f64>], q: f64) -> Vector2<f64> {
    let h: Vec<f64> = conc.iter().map(|c| c[0]).collect();
    let e: Vec<f64> = conc.iter().map(|c| c[1]).collect();
    Vector2::new(percentile(&h, q), percentile(&e, q))
}
