use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::models::EntryTotals;
use crate::utils::to_mib;

/// 进度显示器 - 在统计循环内部非阻塞地轮询
///
/// 不单独开线程：每处理一个条目调用一次 [`ProgressReporter::poll`]，
/// 只有距离上次刷新超过一个周期时才重绘；统计忙碌期间错过的周期直接合并，不会排队。
pub struct ProgressReporter {
    bar: ProgressBar,
    interval: Duration,
    next_tick: Instant,
    started: Instant,
    estimate: EntryTotals,
    redraws: u64,
}

impl ProgressReporter {
    /// 输出到 stderr 的进度显示，`hz` 为每秒刷新次数
    pub fn new(estimate: EntryTotals, hz: u32, started: Instant) -> Self {
        let hz = hz.clamp(1, 1000);
        let draw_hz = hz.min(u32::from(u8::MAX)) as u8;
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(draw_hz));
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        Self::with_bar(bar, estimate, Duration::from_secs(1) / hz, started)
    }

    /// 不显示任何内容（测试或 `--no-progress` 时使用）
    pub fn hidden(estimate: EntryTotals, started: Instant) -> Self {
        Self::with_bar(ProgressBar::hidden(), estimate, Duration::from_millis(20), started)
    }

    fn with_bar(bar: ProgressBar, estimate: EntryTotals, interval: Duration, started: Instant) -> Self {
        Self {
            bar,
            interval,
            next_tick: started + interval,
            started,
            estimate,
            redraws: 0,
        }
    }

    /// 检查是否到了刷新时间，到了就重绘；从不等待
    pub fn poll(&mut self, totals: &EntryTotals) -> bool {
        self.poll_at(totals, Instant::now())
    }

    pub fn poll_at(&mut self, totals: &EntryTotals, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }

        self.bar.set_message(self.status_line(totals, now));
        self.redraws += 1;
        self.next_tick = now + self.interval;
        true
    }

    /// 单行状态：已处理 / 估算总数，MiB，耗时
    pub fn status_line(&self, totals: &EntryTotals, now: Instant) -> String {
        format_status(totals, &self.estimate, now.saturating_duration_since(self.started))
    }

    /// 已重绘的次数
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// 清除进度行
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// 进度行文本，最终报告中也使用同样的格式
pub fn format_status(current: &EntryTotals, estimate: &EntryTotals, elapsed: Duration) -> String {
    format!(
        "  {} / {} ({:.0} / {:.0} MiB) ({:.1}s elapsed)",
        current.entries,
        estimate.entries,
        to_mib(current.bytes),
        to_mib(estimate.bytes),
        elapsed.as_secs_f64(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_before_first_tick_does_nothing() {
        let start = Instant::now();
        let mut progress = ProgressReporter::hidden(EntryTotals::default(), start);

        assert!(!progress.poll_at(&EntryTotals::default(), start + Duration::from_millis(5)));
        assert_eq!(progress.redraws(), 0);
    }

    #[test]
    fn test_missed_ticks_are_coalesced() {
        let start = Instant::now();
        let mut progress = ProgressReporter::hidden(EntryTotals::default(), start);
        let totals = EntryTotals::new(3, 1024);

        // 忙了一整秒，期间错过了 50 个周期，只刷新一次
        assert!(progress.poll_at(&totals, start + Duration::from_secs(1)));
        assert!(!progress.poll_at(&totals, start + Duration::from_millis(1010)));
        assert!(progress.poll_at(&totals, start + Duration::from_millis(1020)));
        assert_eq!(progress.redraws(), 2);
    }

    #[test]
    fn test_status_line_format() {
        let start = Instant::now();
        let progress = ProgressReporter::hidden(EntryTotals::new(20, 10 * 1024 * 1024), start);

        let line = progress.status_line(
            &EntryTotals::new(5, 3 * 1024 * 1024),
            start + Duration::from_millis(1500),
        );

        assert_eq!(line, "  5 / 20 (3 / 10 MiB) (1.5s elapsed)");
    }
}
