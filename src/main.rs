mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, OutputFormat};
use context_profiler::config::Config;
use context_profiler::{output, profile_context, ProfileOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志写到 stderr，stdout 只留给报告
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    // 加载配置
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_default()?
    };

    let show_progress = config.report.show_progress && !cli.no_progress;
    let options = ProfileOptions {
        root: cli.dir.clone(),
        manifest: cli.manifest.clone().unwrap_or(config.context.manifest),
        ignore_file: cli.ignore_file.clone().unwrap_or(config.context.ignore_file),
        top_n: cli.top_n.unwrap_or(config.report.top_n),
        progress_hz: show_progress.then(|| cli.progress_hz.unwrap_or(config.report.progress_hz)),
    };

    let report = profile_context(&options)
        .with_context(|| format!("无法分析构建上下文 {}", options.root.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Table => output::render_table(&report, &mut out)?,
        OutputFormat::Json => output::render_json(&report, &mut out)?,
    }
    out.flush()?;

    Ok(())
}
