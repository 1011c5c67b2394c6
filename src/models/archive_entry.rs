use serde::{Deserialize, Serialize};

/// 归档流中的一个条目（一个文件或目录）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 归档内的路径，统一使用 `/` 分隔
    pub path: String,

    /// 条目的逻辑大小（字节）
    pub size: u64,

    /// 是否是目录
    pub is_dir: bool,

    /// 条目在流中的序号，从 0 开始
    pub ordinal: u64,
}

impl ArchiveEntry {
    /// 条目所属的目录
    ///
    /// 目录条目以 `/` 结尾，因此 `src/` 归属于 `src` 本身。
    pub fn directory(&self) -> String {
        directory_of(&self.path)
    }

    /// 小写扩展名（包含 `.`），没有扩展名时为空字符串
    pub fn extension(&self) -> String {
        extension_of(&self.path.to_lowercase()).to_string()
    }
}

/// 取路径最后一个 `/` 之前的部分，结果为空时返回 `.`
pub fn directory_of(path: &str) -> String {
    let index = match path.rfind('/') {
        Some(index) => index,
        None => return ".".to_string(),
    };

    let parent = path[..index].trim_end_matches('/');
    if !parent.is_empty() {
        parent.to_string()
    } else if path.starts_with('/') {
        "/".to_string()
    } else {
        ".".to_string()
    }
}

/// 取文件名中最后一个 `.` 开始的后缀
pub fn extension_of(path: &str) -> &str {
    let base_start = path.rfind('/').map_or(0, |index| index + 1);
    let base = &path[base_start..];

    match base.rfind('.') {
        Some(index) => &base[index..],
        None => "",
    }
}

/// 条目数与字节数的累计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    pub entries: u64,
    pub bytes: u64,
}

impl EntryTotals {
    pub fn new(entries: u64, bytes: u64) -> Self {
        Self { entries, bytes }
    }

    /// 记录一个条目
    pub fn add(&mut self, size: u64) {
        self.entries += 1;
        self.bytes += size;
    }

    /// 两组累计之差，不会小于 0
    pub fn saturating_sub(&self, other: &EntryTotals) -> EntryTotals {
        EntryTotals {
            entries: self.entries.saturating_sub(other.entries),
            bytes: self.bytes.saturating_sub(other.bytes),
        }
    }
}
