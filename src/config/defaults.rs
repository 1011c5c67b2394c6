/// 默认值集合
pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认的构建清单文件名
    pub fn manifest() -> String {
        "Dockerfile".to_string()
    }

    /// 默认的忽略文件名
    pub fn ignore_file() -> String {
        ".dockerignore".to_string()
    }

    /// 每个排名显示的条目数
    pub fn top_n() -> usize {
        10
    }

    /// 进度行每秒刷新次数
    pub fn progress_hz() -> u32 {
        50
    }

    pub fn show_progress() -> bool {
        true
    }
}
