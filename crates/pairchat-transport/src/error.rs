//! pairchat-transport エラー型

use std::io;

use thiserror::Error;

/// メッセージのフレーミングエラー
#[derive(Debug, Error)]
pub enum FrameError {
    /// 終端行を受け取る前にストリームが終わった（セッション致命的）
    #[error("stream ended before the end-of-message sentinel ({lines_read} line(s) read)")]
    ProtocolDesync { lines_read: usize },

    /// ストリームの読み書きに失敗
    #[error("stream I/O failed: {0}")]
    Io(#[from] io::Error),

    /// 受信行が UTF-8 として不正
    #[error("received line is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// 変換後に行終端を含んでしまう本文行
    #[error("line {line:?} cannot be framed: its transformed form contains a line terminator")]
    UnframeableLine { line: String },

    /// 変換後の終端行が行終端を含む（どのメッセージも区切れない、セッション致命的）
    #[error("sentinel {sentinel:?} cannot be framed under this transform")]
    UnframeableSentinel { sentinel: String },
}

/// ファイル転送エラー
#[derive(Debug, Error)]
pub enum FileError {
    /// チャットのストリーム自体が失敗した（セッション致命的）
    #[error("chat stream failed during file transfer: {0}")]
    Stream(io::Error),

    /// 送信するファイルを読めなかった（残りはゼロ埋めで送信済み）
    #[error("cannot read the file being sent: {0}")]
    Source(io::Error),

    /// 受信したファイルを書けなかった（残りは読み捨て済み）
    #[error("cannot write the received file: {0}")]
    Sink(io::Error),
}

impl FileError {
    /// ストリームが使えなくなったか
    ///
    /// `Source` / `Sink` の場合でもストリームは同期を保っており、セッションは続行できる。
    pub fn is_fatal(&self) -> bool {
        matches!(self, FileError::Stream(_))
    }
}
