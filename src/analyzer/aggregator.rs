use std::collections::HashMap;
use std::io::{self, Read};
use std::time::Instant;

use crate::analyzer::{CountingReader, ProgressReporter};
use crate::error::{ProfileError, Result};
use crate::models::{ArchiveEntry, EntryTotals};

/// 按目录和扩展名累计的统计数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    /// 目录 -> 字节数
    pub dir_bytes: HashMap<String, u64>,

    /// 目录 -> 条目数
    pub dir_entries: HashMap<String, u64>,

    /// 目录 -> 耗时（纳秒）
    pub dir_nanos: HashMap<String, u64>,

    /// 小写扩展名 -> 字节数，只统计非目录条目
    pub ext_bytes: HashMap<String, u64>,
}

/// 流式统计器 - 按流的顺序逐个折叠条目
pub struct ContextAggregator {
    aggregates: Aggregates,
    totals: EntryTotals,
    last: Instant,
}

impl ContextAggregator {
    /// `started` 是组装开始的时刻，第一个条目的耗时从这里算起
    pub fn new(started: Instant) -> Self {
        Self {
            aggregates: Aggregates::default(),
            totals: EntryTotals::default(),
            last: started,
        }
    }

    /// 下一个条目的序号
    pub fn next_ordinal(&self) -> u64 {
        self.totals.entries
    }

    /// 记录一个条目，`now` 为读到它的时刻
    pub fn record(&mut self, entry: &ArchiveEntry, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        let dir = entry.directory();
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);

        *self.aggregates.dir_bytes.entry(dir.clone()).or_insert(0) += entry.size;
        *self.aggregates.dir_nanos.entry(dir.clone()).or_insert(0) += nanos;
        *self.aggregates.dir_entries.entry(dir).or_insert(0) += 1;

        if !entry.is_dir {
            *self.aggregates.ext_bytes.entry(entry.extension()).or_insert(0) += entry.size;
        }

        self.totals.add(entry.size);
    }

    pub fn totals(&self) -> &EntryTotals {
        &self.totals
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn finish(self) -> (Aggregates, EntryTotals) {
        (self.aggregates, self.totals)
    }
}

/// 一次完整读取归档流的结果
#[derive(Debug, Clone)]
pub struct StreamAnalysis {
    pub aggregates: Aggregates,

    /// 归档中条目数与负载字节数
    pub totals: EntryTotals,

    /// 从流中读出的全部字节数（含头部和填充）
    pub stream_bytes: u64,
}

impl StreamAnalysis {
    /// tar 格式本身占用的字节数
    pub fn tar_overhead_bytes(&self) -> u64 {
        self.stream_bytes.saturating_sub(self.totals.bytes)
    }
}

/// 逐个读取归档头部并统计，直到流结束
///
/// 除正常结束之外的任何读取错误都会中止整个统计，已累计的数据全部丢弃。
/// `reader` 在所有返回路径上都会被释放。
pub fn analyze_stream<R: Read>(
    reader: R,
    started: Instant,
    progress: &mut ProgressReporter,
) -> Result<StreamAnalysis> {
    let mut archive = tar::Archive::new(CountingReader::new(reader));
    let mut aggregator = ContextAggregator::new(started);

    for entry in archive.entries().map_err(ProfileError::from_stream)? {
        let entry = entry.map_err(ProfileError::from_stream)?;

        let archive_entry = ArchiveEntry {
            path: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            size: entry.size(),
            is_dir: entry.header().entry_type().is_dir(),
            ordinal: aggregator.next_ordinal(),
        };

        aggregator.record(&archive_entry, Instant::now());
        progress.poll(aggregator.totals());
    }

    // 读完结尾的填充块，总字节数才包含完整的归档
    let mut counter = archive.into_inner();
    io::copy(&mut counter, &mut io::sink()).map_err(ProfileError::from_stream)?;

    let stream_bytes = counter.bytes_read();
    let (aggregates, totals) = aggregator.finish();
    tracing::info!(
        "归档共 {} 个条目，负载 {} 字节，流 {} 字节",
        totals.entries,
        totals.bytes,
        stream_bytes
    );

    Ok(StreamAnalysis {
        aggregates,
        totals,
        stream_bytes,
    })
}
