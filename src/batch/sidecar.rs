//! # 元数据 (sidecar) 文件复制
//!
//! 递归复制匹配模式的元数据文件（默认 `*.json`）到输出目录，
//! 保留文件名，覆盖已存在的目标文件，并保留访问 / 修改时间。
//! 源文件与目标相同时跳过。
//!
//! ## 依赖关系
//! - 被 `commands/sidecars.rs`, `commands/normalize.rs` 调用
//! - 使用 `batch/collector.rs`, `batch/runner.rs`

use super::apply::prepare_dirs;
use super::collector::FileCollector;
use super::runner::{BatchResult, BatchRunner, ProcessResult};
use crate::error::{HistoprepError, Result};

use log::debug;
use std::fs::{self, File, FileTimes};
use std::path::Path;

/// 复制单个文件并保留时间戳
fn copy_preserving_times(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| HistoprepError::FileReadError {
        path: src.display().to_string(),
        source: e,
    })?;

    fs::copy(src, dst).map_err(|e| HistoprepError::FileWriteError {
        path: dst.display().to_string(),
        source: e,
    })?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    // 修改时间戳只需要文件所有权，只读句柄即可，源文件只读时目标同样只读
    File::open(dst)
        .and_then(|f| f.set_times(times))
        .map_err(|e| HistoprepError::FileWriteError {
            path: dst.display().to_string(),
            source: e,
        })
}

/// 源与目标是否指向同一文件
fn is_same_file(src: &Path, dst: &Path) -> bool {
    match (fs::canonicalize(src), fs::canonicalize(dst)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// 复制所有元数据文件到 `output_root`（平铺）
///
/// 目标就是源文件本身时（例如输入输出目录相同）跳过，不做截断复制。
pub fn copy_sidecars(input_root: &Path, output_root: &Path, patterns: &str) -> Result<BatchResult> {
    prepare_dirs(input_root, output_root)?;

    let files = FileCollector::new(input_root).with_pattern(patterns)?.collect();
    debug!("{} sidecar file(s) under {}", files.len(), input_root.display());

    BatchRunner::new("Copying").run(&files, |src| {
        let name = src.file_name().ok_or_else(|| HistoprepError::FileNotFound {
            path: src.display().to_string(),
        })?;
        let dst = output_root.join(name);

        if is_same_file(src, &dst) {
            return Ok(ProcessResult::Failed(
                src.display().to_string(),
                "source and destination are the same file".to_string(),
            ));
        }

        copy_preserving_times(src, &dst)?;
        Ok(ProcessResult::Success(format!(
            "{} -> {}",
            src.display(),
            dst.display()
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::collector::SIDECAR_PATTERNS;
    use crate::test_utils::TempDir;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_copies_only_json_byte_identical() {
        let input = TempDir::new("sidecar-in");
        let output = TempDir::new("sidecar-out");
        fs::create_dir_all(input.path().join("case1/region")).unwrap();

        fs::write(input.path().join("a.json"), br#"{"label": "tumor"}"#).unwrap();
        fs::write(input.path().join("case1/b.JSON"), br#"{"mpp": 0.25}"#).unwrap();
        fs::write(input.path().join("case1/region/c.json"), b"[]").unwrap();
        fs::write(input.path().join("case1/tile.png"), b"png").unwrap();
        fs::write(input.path().join("notes.txt"), b"txt").unwrap();

        let result = copy_sidecars(input.path(), output.path(), SIDECAR_PATTERNS).unwrap();
        assert_eq!(result.success, 3);

        let mut names: Vec<String> = fs::read_dir(output.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.json", "b.JSON", "c.json"]);

        assert_eq!(
            fs::read(output.path().join("b.JSON")).unwrap(),
            fs::read(input.path().join("case1/b.JSON")).unwrap()
        );
    }

    #[test]
    fn test_overwrites_and_preserves_mtime() {
        let input = TempDir::new("sidecar-mtime-in");
        let output = TempDir::new("sidecar-mtime-out");

        let src = input.path().join("meta.json");
        fs::write(&src, b"new").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        fs::write(output.path().join("meta.json"), b"old contents").unwrap();

        copy_sidecars(input.path(), output.path(), SIDECAR_PATTERNS).unwrap();

        let dst = output.path().join("meta.json");
        assert_eq!(fs::read(&dst).unwrap(), b"new");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_same_directory_does_not_truncate() {
        let dir = TempDir::new("sidecar-same");
        fs::create_dir_all(dir.path().join("case")).unwrap();
        fs::write(dir.path().join("meta.json"), br#"{"label":"tumor"}"#).unwrap();
        fs::write(dir.path().join("case/nested.json"), b"[1]").unwrap();

        let result = copy_sidecars(dir.path(), dir.path(), SIDECAR_PATTERNS).unwrap();

        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 1);
        assert!(result.failures[0].0.ends_with("meta.json"));
        assert_eq!(
            fs::read(dir.path().join("meta.json")).unwrap(),
            br#"{"label":"tumor"}"#
        );
        assert_eq!(fs::read(dir.path().join("nested.json")).unwrap(), b"[1]");
    }

    #[test]
    fn test_read_only_source_is_copied_with_times() {
        let input = TempDir::new("sidecar-ro-in");
        let output = TempDir::new("sidecar-ro-out");

        let src = input.path().join("ro.json");
        fs::write(&src, b"{}").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();
        let mut perms = fs::metadata(&src).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&src, perms).unwrap();

        let result = copy_sidecars(input.path(), output.path(), SIDECAR_PATTERNS).unwrap();
        assert_eq!(result.success, 1);

        let dst = output.path().join("ro.json");
        assert_eq!(fs::read(&dst).unwrap(), b"{}");
        assert!(fs::metadata(&dst).unwrap().permissions().readonly());
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }
}
