//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式，大小写不敏感）
//! - 递归目录搜索，结果按路径排序，保证输出确定
//!
//! ## 依赖关系
//! - 被 `batch/apply.rs`, `batch/sidecar.rs`, `stats/` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob::Pattern` 匹配文件名

use crate::error::{HistoprepError, Result};

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认图像模式
pub const IMAGE_PATTERNS: &str = "*.jpg,*.png";

/// 默认元数据模式
pub const SIDECAR_PATTERNS: &str = "*.json";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
}

impl FileCollector {
    /// 创建新的文件收集器（匹配所有文件）
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: Vec::new(),
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    HistoprepError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件是否匹配任一模式（无模式时全部匹配）
    fn matches_patterns(&self, path: &Path) -> bool {
        // 非 UTF-8 文件名按有损转换后的名字匹配，路径本身保持原样
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|p| p.matches_with(&filename, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TempDir;
    use std::fs;

    #[test]
    fn test_pattern_match_is_case_insensitive() {
        let collector = FileCollector::new("unused").with_pattern(IMAGE_PATTERNS).unwrap();
        assert!(collector.matches_patterns(Path::new("a/tile.png")));
        assert!(collector.matches_patterns(Path::new("a/TILE.JPG")));
        assert!(collector.matches_patterns(Path::new("Tile.Png")));
        assert!(!collector.matches_patterns(Path::new("tile.jpeg")));
        assert!(!collector.matches_patterns(Path::new("tile.json")));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_collected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new("collector-bytes");
        let odd = dir.path().join(OsStr::from_bytes(b"slide\xff.png"));
        fs::write(&odd, b"").unwrap();

        let files = FileCollector::new(dir.path())
            .with_pattern(IMAGE_PATTERNS)
            .unwrap()
            .collect();
        assert_eq!(files, vec![odd]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(FileCollector::new("unused").with_pattern("[*.png").is_err());
    }

    #[test]
    fn test_collect_recurses_and_sorts() {
        let dir = TempDir::new("collector");
        fs::create_dir_all(dir.path().join("b/deep")).unwrap();
        fs::write(dir.path().join("z.png"), b"").unwrap();
        fs::write(dir.path().join("b/deep/a.JPG"), b"").unwrap();
        fs::write(dir.path().join("b/notes.txt"), b"").unwrap();

        let collector = FileCollector::new(dir.path()).with_pattern(IMAGE_PATTERNS).unwrap();
        let files = collector.collect();
        assert_eq!(
            files,
            vec![dir.path().join("b/deep/a.JPG"), dir.path().join("z.png")]
        );
    }
}
