//! 测试辅助：临时目录与合成切片

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// 临时目录，drop 时删除
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "histoprep-{}-{}-{}",
            prefix,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Ruifrok 苏木精 / 伊红 OD 向量
const HEMATOXYLIN: [f64; 3] = [0.65, 0.70, 0.29];
const EOSIN: [f64; 3] = [0.07, 0.99, 0.11];

/// 合成 H&E 切片：左上角为白色背景，其余像素为两种染料的非负混合
pub fn synthetic_he_tile(width: u32, height: u32, h_scale: f64, e_scale: f64) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x < width / 6 && y < height / 6 {
            return Rgb([255, 255, 255]);
        }
        let u = x as f64 / width.max(1) as f64;
        let v = y as f64 / height.max(1) as f64;
        let ch = h_scale * (0.2 + 0.8 * u);
        let ce = e_scale * (0.2 + 0.8 * v);
        let mut px = [0u8; 3];
        for (c, out) in px.iter_mut().enumerate() {
            let od = ch * HEMATOXYLIN[c] + ce * EOSIN[c];
            *out = (255.0 * (-od).exp()).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(px)
    })
}

/// 写入单一灰度值的 PNG
pub fn write_gray_png(path: &Path, value: u8) {
    GrayImage::from_pixel(8, 8, Luma([value]))
        .save(path)
        .expect("write gray png");
}

/// 写入单一颜色的 PNG
pub fn write_rgb_png(path: &Path, color: [u8; 3]) {
    RgbImage::from_pixel(8, 8, Rgb(color))
        .save(path)
        .expect("write rgb png");
}
