//! pairchat-session エラー型

use std::io;

use pairchat_proto::ConfigError;
use pairchat_stream::StreamError;
use pairchat_transport::{FileError, FrameError};
use thiserror::Error;

/// セッションを終わらせるエラー
///
/// ローカルで回復できる失敗（不正な `/file` 引数、ファイル I/O）は
/// オペレーターに表示するだけでここには来ない。
#[derive(Debug, Error)]
pub enum SessionError {
    /// 端点が使えない（ループを開始しない）
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// 設定値が不正
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// メッセージの送受信に失敗（終端行前の EOF を含む）
    #[error("protocol error: {0}")]
    Frame(#[from] FrameError),

    /// ファイル転送中にストリームが壊れた
    #[error("file transfer broke the stream: {0}")]
    FileStream(FileError),

    /// キーボード入力に失敗
    #[error("console I/O failed: {0}")]
    Console(io::Error),
}
