use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analyzer::{rank, top_n, StreamAnalysis};
use crate::models::EntryTotals;

/// 排名中的一项：键（目录或扩展名）与数值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: u64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, value: u64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// 一次分析的最终报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    /// 上下文根目录
    pub root: String,

    /// 使用的忽略文件名
    pub ignore_file: String,

    /// 未经过滤的磁盘遍历结果（上界）
    pub on_disk: EntryTotals,

    /// 实际进入归档的条目
    pub included: EntryTotals,

    /// 被忽略规则排除的条目
    pub excluded: EntryTotals,

    /// tar 头部与填充占用的字节数
    pub tar_overhead_bytes: u64,

    /// 组装加统计的总耗时
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,

    /// 每个排名保留的条目数
    pub top_n: usize,

    /// 按耗时排序的目录（纳秒）
    pub dirs_by_time: Vec<RankedEntry>,

    /// 按大小排序的目录（字节）
    pub dirs_by_size: Vec<RankedEntry>,

    /// 按条目数排序的目录
    pub dirs_by_count: Vec<RankedEntry>,

    /// 按大小排序的扩展名（字节）
    pub extensions_by_size: Vec<RankedEntry>,
}

impl ContextReport {
    /// 根据流统计结果和磁盘估算生成报告
    pub fn build(
        root: impl Into<String>,
        ignore_file: impl Into<String>,
        on_disk: EntryTotals,
        analysis: &StreamAnalysis,
        elapsed: Duration,
        n: usize,
    ) -> Self {
        let aggregates = &analysis.aggregates;
        let included = analysis.totals;

        Self {
            root: root.into(),
            ignore_file: ignore_file.into(),
            on_disk,
            included,
            excluded: on_disk.saturating_sub(&included),
            tar_overhead_bytes: analysis.tar_overhead_bytes(),
            elapsed,
            top_n: n,
            dirs_by_time: top_n(rank(&aggregates.dir_nanos), n),
            dirs_by_size: top_n(rank(&aggregates.dir_bytes), n),
            dirs_by_count: top_n(rank(&aggregates.dir_entries), n),
            extensions_by_size: top_n(rank(&aggregates.ext_bytes), n),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
