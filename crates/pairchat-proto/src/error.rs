//! pairchat-proto エラー型

use pairchat_cipher::CipherError;
use thiserror::Error;

/// 設定の読み込み・検証エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 設定ファイルを読めない
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON として不正
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// 終端行が空
    #[error("sentinel must not be empty")]
    EmptySentinel,

    /// 終端行がエスケープ文字で始まる（本文行のエスケープと区別できない）
    #[error("sentinel {sentinel:?} must not start with the escape character {escape:?}")]
    SentinelStartsWithEscape { sentinel: String, escape: char },

    /// ローテーション鍵が不正
    #[error("invalid rotation key: {0}")]
    Cipher(#[from] CipherError),

    /// 鍵で変換すると行終端になる文字がある（その値を含む行をフレーミングできない）
    #[error("rotation key {key} turns `{field}` into a line terminator")]
    UnframeableUnderKey { key: i32, field: &'static str },

    /// 1 行でなければならない値に改行が含まれる
    #[error("config field `{field}` must be a single line")]
    MultilineValue { field: &'static str },
}
