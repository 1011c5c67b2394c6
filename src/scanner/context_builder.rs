use std::collections::HashSet;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ProfileError, Result};
use crate::scanner::archive_pipe::ContextArchive;
use crate::scanner::IgnoreRules;

/// 构建上下文归档组装器 - 按构建客户端的方式把目录打成未压缩的 tar
pub struct ContextBuilder {
    /// 上下文根目录
    root: PathBuf,

    /// 归档内的构建清单文件名（已规范化）
    manifest: String,

    /// 忽略文件名
    ignore_file: String,

    /// 已加载的忽略规则
    rules: IgnoreRules,

    /// 需要遍历的根；第一个总是 `.`
    includes: Vec<String>,
}

impl ContextBuilder {
    /// 创建组装器，规范化清单文件名并决定需要强制包含的文件
    pub fn new(
        root: impl Into<PathBuf>,
        manifest: &str,
        ignore_file: &str,
        rules: IgnoreRules,
    ) -> Result<Self> {
        let manifest = canonical_archive_name(manifest)?;
        let ignore_file = canonical_archive_name(ignore_file)?;

        // 忽略文件或清单被排除时，两个都要强制发送，由构建端自行决定是否移除
        let mut includes = vec![".".to_string()];
        if rules.matches(&ignore_file) || rules.matches(&manifest) {
            tracing::debug!("强制包含 {} 和 {}", ignore_file, manifest);
            includes.push(ignore_file.clone());
            includes.push(manifest.clone());
        }

        Ok(Self {
            root: root.into(),
            manifest,
            ignore_file,
            rules,
            includes,
        })
    }

    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    pub fn ignore_file(&self) -> &str {
        &self.ignore_file
    }

    /// 强制包含列表（不含 `.`）
    pub fn forced_includes(&self) -> &[String] {
        &self.includes[1..]
    }

    /// 在后台线程中组装归档，返回可流式读取的句柄
    pub fn spawn(self) -> Result<ContextArchive> {
        ContextArchive::spawn(self)
    }

    /// 把归档同步写入 `writer`，完成后返回它
    pub fn write_to<W: Write>(&self, writer: W) -> Result<W> {
        let mut builder = tar::Builder::new(writer);
        builder.follow_symlinks(false);

        let mut seen = HashSet::new();
        for include in &self.includes {
            self.append_include(&mut builder, include, &mut seen)?;
        }

        builder.into_inner().map_err(|source| ProfileError::Assembly {
            path: self.root.clone(),
            source,
        })
    }

    /// 遍历一个包含根，按字典序逐个写入存活的条目
    fn append_include<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        include: &str,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        let walk_root = if include == "." {
            self.root.clone()
        } else {
            self.root.join(include)
        };

        // 强制包含的文件可能并不存在
        if include != "." && walk_root.symlink_metadata().is_err() {
            tracing::debug!("强制包含的文件不存在: {}", walk_root.display());
            return Ok(());
        }

        let mut walker = WalkDir::new(&walk_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = walker.next() {
            let entry = next?;
            let name = relative_name(&self.root, entry.path())?;
            if name.is_empty() {
                continue;
            }

            let file_type = entry.file_type();
            let is_dir = file_type.is_dir();

            // 显式包含的路径不受排除规则影响
            let excluded = include != name && self.rules.matches(&name);
            if excluded {
                if !is_dir {
                    continue;
                }
                if self.rules.has_exceptions() && self.rules.has_exception_under(&name) {
                    // 目录本身不发送，但下面有重新包含的内容，继续深入
                    continue;
                }
                walker.skip_current_dir();
                continue;
            }

            if !(is_dir || file_type.is_file() || file_type.is_symlink()) {
                tracing::debug!("跳过特殊文件: {}", name);
                continue;
            }

            if !seen.insert(name.clone()) {
                continue;
            }

            let archive_name = if is_dir { format!("{name}/") } else { name };
            builder
                .append_path_with_name(entry.path(), &archive_name)
                .map_err(|source| ProfileError::Assembly {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
        }

        Ok(())
    }
}

/// 把相对路径规范化为归档内使用的 `/` 分隔名称
///
/// 绝对路径、越出根目录的路径以及空路径都视为无效。
pub fn canonical_archive_name(path: &str) -> Result<String> {
    let mut parts = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(ProfileError::InvalidManifest(path.to_string())),
            },
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ProfileError::InvalidManifest(path.to_string()));
            }
        }
    }

    if parts.is_empty() {
        return Err(ProfileError::InvalidManifest(path.to_string()));
    }

    Ok(parts.join("/"))
}

/// 条目相对上下文根目录的归档名；根目录本身返回空字符串
fn relative_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| ProfileError::Assembly {
        path: path.to_path_buf(),
        source: std::io::Error::other("路径不在上下文目录之内"),
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            // 规则只能匹配 UTF-8 名称，不做有损替换
            let part = part.to_str().ok_or_else(|| ProfileError::Assembly {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "文件名不是有效的 UTF-8"),
            })?;
            parts.push(part);
        }
    }

    Ok(parts.join("/"))
}
