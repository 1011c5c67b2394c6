pub mod analyzer;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod scanner;
pub mod utils;

use std::path::PathBuf;
use std::time::Instant;

pub use analyzer::{analyze_stream, ProgressReporter, StreamAnalysis};
pub use error::{ProfileError, Result};
pub use models::{ContextReport, EntryTotals, RankedEntry};
pub use scanner::{ContextBuilder, DiskWalker, IgnoreRules};

/// 一次分析的参数
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// 上下文根目录
    pub root: PathBuf,

    /// 构建清单文件名
    pub manifest: String,

    /// 忽略文件名
    pub ignore_file: String,

    /// 每个排名保留的条目数
    pub top_n: usize,

    /// 进度行刷新频率；`None` 表示不显示
    pub progress_hz: Option<u32>,
}

/// 组装构建上下文并统计，返回完整报告
///
/// 配置类错误（忽略文件、清单名）在任何归档工作开始前返回；
/// 之后的任何失败都会中止整个分析，不会产生部分报告。
pub fn profile_context(options: &ProfileOptions) -> Result<ContextReport> {
    let rules = IgnoreRules::load(&options.root, &options.ignore_file)?;
    let builder = ContextBuilder::new(&options.root, &options.manifest, &options.ignore_file, rules)?;

    // 估算必须在组装开始前完成，两者互不影响
    let on_disk = DiskWalker::new().estimate(&options.root);

    let started = Instant::now();
    let mut progress = match options.progress_hz {
        Some(hz) => ProgressReporter::new(on_disk, hz, started),
        None => ProgressReporter::hidden(on_disk, started),
    };

    let analysis = builder
        .spawn()
        .and_then(|archive| analyze_stream(archive, started, &mut progress));
    progress.finish();
    let analysis = analysis?;

    Ok(ContextReport::build(
        options.root.display().to_string(),
        options.ignore_file.clone(),
        on_disk,
        &analysis,
        started.elapsed(),
        options.top_n,
    ))
}
