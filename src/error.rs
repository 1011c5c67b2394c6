use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfileError>;

/// 构建上下文分析过程中的致命错误
#[derive(Error, Debug)]
pub enum ProfileError {
    /// 忽略文件存在但无法读取
    #[error("无法读取忽略文件 {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 忽略规则语法错误
    #[error("无效的忽略规则 `{pattern}`: {message}")]
    IgnorePattern { pattern: String, message: String },

    #[error("无效的构建清单文件名: {0}")]
    InvalidManifest(String),

    #[error("配置文件错误 {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// 遍历上下文目录失败
    #[error("遍历上下文目录失败: {0}")]
    Walk(#[from] walkdir::Error),

    /// 写入归档条目失败
    #[error("无法将 {path} 加入归档: {source}")]
    Assembly {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 读取归档流失败（不包括正常的流结束）
    #[error("读取归档失败: {0}")]
    Stream(#[source] io::Error),
}

impl ProfileError {
    /// 将读取端收到的 io 错误还原为生产者一侧的原始错误
    ///
    /// 生产者线程把组装错误包装进 `io::Error` 穿过管道，这里把它拆出来，
    /// 其余的错误一律视为流错误。
    pub fn from_stream(err: io::Error) -> Self {
        let carries_profile_error = err
            .get_ref()
            .map_or(false, |inner| inner.is::<ProfileError>());

        if !carries_profile_error {
            return ProfileError::Stream(err);
        }

        match err.into_inner().map(|inner| inner.downcast::<ProfileError>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => ProfileError::Stream(io::Error::other(other)),
            None => ProfileError::Stream(io::Error::other("归档生产者失败")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stream_plain_io_error() {
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let converted = ProfileError::from_stream(err);

        match converted {
            ProfileError::Stream(inner) => assert_eq!(inner.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("意外的错误类型: {other:?}"),
        }
    }

    #[test]
    fn test_from_stream_unwraps_assembly_error() {
        let original = ProfileError::Assembly {
            path: PathBuf::from("secret.key"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let carried = io::Error::other(original);

        match ProfileError::from_stream(carried) {
            ProfileError::Assembly { path, source } => {
                assert_eq!(path, PathBuf::from("secret.key"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("意外的错误类型: {other:?}"),
        }
    }
}
