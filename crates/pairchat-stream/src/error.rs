//! pairchat-stream エラー型

use std::fmt;

use thiserror::Error;

/// 欠けている端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// 読み込み側
    Source,
    /// 書き込み側
    Sink,
    /// 両方
    Both,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "input"),
            Side::Sink => write!(f, "output"),
            Side::Both => write!(f, "input and output"),
        }
    }
}

/// 端点のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// 端点が使えない（セッションを開始しない）
    #[error("connection unavailable: {side} stream is not valid")]
    ConnectionUnavailable { side: Side },
}
