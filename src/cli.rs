use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "context-profiler")]
#[command(about = "分析容器构建上下文：哪些目录和文件类型占用了空间和时间")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// 构建上下文目录
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// 构建清单文件名（相对上下文目录）
    #[arg(short = 'f', long = "file")]
    pub manifest: Option<String>,

    /// 忽略文件名（相对上下文目录）
    #[arg(long)]
    pub ignore_file: Option<String>,

    /// 每个排名显示的条目数
    #[arg(short = 'n', long = "top")]
    pub top_n: Option<usize>,

    /// 进度行每秒刷新次数
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub progress_hz: Option<u32>,

    /// 不显示进度行
    #[arg(long)]
    pub no_progress: bool,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// 表格格式
    Table,
    /// JSON 格式
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["context-profiler"]);

        assert_eq!(cli.dir, PathBuf::from("."));
        assert!(cli.manifest.is_none());
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(!cli.no_progress);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "context-profiler",
            "app",
            "-f",
            "docker/Dockerfile",
            "--ignore-file",
            ".buildignore",
            "-n",
            "5",
            "--format",
            "json",
        ]);

        assert_eq!(cli.dir, PathBuf::from("app"));
        assert_eq!(cli.manifest.as_deref(), Some("docker/Dockerfile"));
        assert_eq!(cli.ignore_file.as_deref(), Some(".buildignore"));
        assert_eq!(cli.top_n, Some(5));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_zero_hz_rejected() {
        assert!(Cli::try_parse_from(["context-profiler", "--progress-hz", "0"]).is_err());
    }
}
