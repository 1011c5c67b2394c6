use std::path::Path;

use walkdir::WalkDir;

use crate::models::EntryTotals;

/// 磁盘遍历器 - 不应用任何忽略规则，只为进度条估算上界
///
/// 这里的遍历方式和归档组装并不完全一致（例如特殊文件的处理），
/// 得到的只是估算值。
pub struct DiskWalker {
    follow_symlinks: bool,
}

impl DiskWalker {
    pub fn new() -> Self {
        Self {
            follow_symlinks: false,
        }
    }

    /// 统计根目录下的所有条目数和普通文件的总字节数（根目录本身不计）
    pub fn estimate(&self, root: &Path) -> EntryTotals {
        let mut totals = EntryTotals::default();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.follow_symlinks);

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let size = if entry.file_type().is_file() {
                        entry.metadata().map(|metadata| metadata.len()).unwrap_or(0)
                    } else {
                        0
                    };
                    totals.add(size);
                }
                Err(err) => {
                    tracing::warn!("预扫描时跳过: {}", err);
                }
            }
        }

        tracing::info!(
            "磁盘上共 {} 个条目，{} 字节",
            totals.entries,
            totals.bytes
        );
        totals
    }
}

impl Default for DiskWalker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_estimate_empty_directory() {
        let temp_dir = tempdir().unwrap();

        let totals = DiskWalker::new().estimate(temp_dir.path());

        assert_eq!(totals, EntryTotals::new(0, 0));
    }

    #[test]
    fn test_estimate_counts_dirs_but_only_file_bytes() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("src/main.rs"), vec![b'x'; 40]).unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), vec![b'y'; 100]).unwrap();

        let totals = DiskWalker::new().estimate(temp_dir.path());

        assert_eq!(totals, EntryTotals::new(3, 140));
    }

    #[test]
    fn test_estimate_missing_root_is_zero() {
        let temp_dir = tempdir().unwrap();

        let totals = DiskWalker::new().estimate(&temp_dir.path().join("missing"));

        assert_eq!(totals.entries, 0);
    }
}
