use std::io::{self, Write};

use crate::analyzer::format_status;
use crate::models::{ContextReport, RankedEntry};
use crate::utils::{nanos_to_millis, to_mib};

/// 以文本表格输出报告
pub fn render_table<W: Write>(report: &ContextReport, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Scanning local directory (in tar / on disk):")?;
    writeln!(
        out,
        "{} .. completed",
        format_status(&report.included, &report.on_disk, report.elapsed)
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "Excluded by {}: {} files totalling {:.2} MiB",
        report.ignore_file,
        report.excluded.entries,
        to_mib(report.excluded.bytes)
    )?;
    writeln!(out)?;

    writeln!(out, "Final .tar:")?;
    writeln!(
        out,
        "  {} files totalling {:.2} MiB (+ {:.2} MiB tar overhead)",
        report.included.entries,
        to_mib(report.included.bytes),
        to_mib(report.tar_overhead_bytes)
    )?;
    writeln!(out, "  Took {:.2} seconds to build", report.elapsed.as_secs_f64())?;
    writeln!(out)?;

    let n = report.top_n;

    render_section(out, &format!("Top {n} directories by time spent:"), &report.dirs_by_time, |e| {
        format!("{:5} ms: {}", nanos_to_millis(e.value), e.key)
    })?;

    render_section(out, &format!("Top {n} directories by storage:"), &report.dirs_by_size, |e| {
        format!("{:7.2} MiB: {}", to_mib(e.value), e.key)
    })?;

    render_section(out, &format!("Top {n} directories by file count:"), &report.dirs_by_count, |e| {
        format!("{:5}: {}", e.value, e.key)
    })?;

    render_section(out, &format!("Top {n} file extensions by storage:"), &report.extensions_by_size, |e| {
        format!("{:7.2} MiB: {}", to_mib(e.value), e.key)
    })?;

    Ok(())
}

fn render_section<W, F>(out: &mut W, title: &str, entries: &[RankedEntry], line: F) -> io::Result<()>
where
    W: Write,
    F: Fn(&RankedEntry) -> String,
{
    writeln!(out, "{title}")?;
    for entry in entries {
        writeln!(out, "{}", line(entry))?;
    }
    writeln!(out)
}

/// 以 JSON 输出完整报告
pub fn render_json<W: Write>(report: &ContextReport, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryTotals;
    use std::time::Duration;

    fn sample_report() -> ContextReport {
        ContextReport {
            root: ".".to_string(),
            ignore_file: ".dockerignore".to_string(),
            on_disk: EntryTotals::new(4, 3 * 1024 * 1024),
            included: EntryTotals::new(2, 1024 * 1024),
            excluded: EntryTotals::new(2, 2 * 1024 * 1024),
            tar_overhead_bytes: 2048,
            elapsed: Duration::from_millis(1500),
            top_n: 10,
            dirs_by_time: vec![RankedEntry::new("src", 12_345_678)],
            dirs_by_size: vec![RankedEntry::new("src", 1024 * 1024)],
            dirs_by_count: vec![RankedEntry::new("src", 2)],
            extensions_by_size: vec![RankedEntry::new(".rs", 1024 * 1024), RankedEntry::new("", 0)],
        }
    }

    #[test]
    fn test_render_table() {
        let mut out = Vec::new();
        render_table(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("  2 / 4 (1 / 3 MiB) (1.5s elapsed) .. completed"));
        assert!(text.contains("Excluded by .dockerignore: 2 files totalling 2.00 MiB"));
        assert!(text.contains("  2 files totalling 1.00 MiB (+ 0.00 MiB tar overhead)"));
        assert!(text.contains("  Took 1.50 seconds to build"));
        assert!(text.contains("Top 10 directories by time spent:\n   12 ms: src\n"));
        assert!(text.contains("Top 10 directories by storage:\n   1.00 MiB: src\n"));
        assert!(text.contains("Top 10 directories by file count:\n    2: src\n"));
        assert!(text.contains("Top 10 file extensions by storage:\n   1.00 MiB: .rs\n   0.00 MiB: \n"));
    }

    #[test]
    fn test_render_json() {
        let mut out = Vec::new();
        render_json(&sample_report(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["included"]["entries"], 2);
        assert_eq!(value["excluded"]["bytes"], 2 * 1024 * 1024);
        assert_eq!(value["elapsed"], 1.5);
        assert_eq!(value["dirs_by_time"][0]["key"], "src");
    }
}
