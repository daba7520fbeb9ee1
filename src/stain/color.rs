//! # 颜色空间转换
//!
//! sRGB (8 位) 与 CIE L*a*b* (D65 白点) 之间的逐像素转换。
//!
//! ## 依赖关系
//! - 被 `stain/reinhard.rs` 和 `stain/density.rs`（组织掩膜）使用
//! - 使用 `palette` crate

use palette::white_point::D65;
use palette::{FromColor, IntoColor, Lab, LinSrgb, Srgb};

type LabD65 = Lab<D65, f64>;

/// sRGB -> L*a*b*，L 的范围为 [0, 100]
pub fn rgb_to_lab(rgb: [u8; 3]) -> [f64; 3] {
    let srgb: Srgb<f64> = Srgb::new(
        rgb[0] as f64 / 255.0,
        rgb[1] as f64 / 255.0,
        rgb[2] as f64 / 255.0,
    );
    let lin: LinSrgb<f64> = srgb.into_linear();
    let lab = LabD65::from_color(lin);
    [lab.l, lab.a, lab.b]
}

/// L*a*b* -> sRGB，超出色域的值被截断
pub fn lab_to_rgb(lab: [f64; 3]) -> [u8; 3] {
    let lin: LinSrgb<f64> = LabD65::new(lab[0], lab[1], lab[2]).into_color();
    // 先在线性空间截断，负值无法通过 sRGB 传递函数
    let lin = LinSrgb::new(
        lin.red.clamp(0.0, 1.0),
        lin.green.clamp(0.0, 1.0),
        lin.blue.clamp(0.0, 1.0),
    );
    let srgb: Srgb<f64> = Srgb::from_linear(lin);
    [srgb.red, srgb.green, srgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// 亮度 L* / 100，范围 [0, 1]
pub fn luminosity(rgb: [u8; 3]) -> f64 {
    rgb_to_lab(rgb)[0] / 100.0
}
