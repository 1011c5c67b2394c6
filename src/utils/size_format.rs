const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// 字节数换算为 MiB（1024² 字节）
pub fn to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

/// 纳秒换算为毫秒，向下取整
pub fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / 1_000_000
}
