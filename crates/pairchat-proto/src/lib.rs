//! # pairchat-proto
//!
//! pairchat プロトコルの定義：ワイヤ定数、スラッシュコマンドの字句解析、設定値。
//!
//! ## ワイヤフォーマット
//!
//! ```text
//! テキスト行   : transform(text) + "\n"
//! 終端行       : transform("(end)") + "\n"       ← 発言権を相手に渡す
//! ファイル転送 : [length: u64 BE (8 bytes)][transform(byte) × length]
//! ```
//!
//! ## 発言権（ターン）
//!
//! 常にどちらか一方だけが送信できる。受信側は終端行を読んだ時点で
//! 発言権を得て、次は必ず自分が送信する。

pub mod canned;
pub mod command;
pub mod config;
pub mod error;

pub use command::{Command, Status};
pub use config::{ChatConfig, WireConfig};
pub use error::ConfigError;

/// メッセージ終端を表す予約行
pub const SENTINEL: &str = "(end)";

/// 終端行と同じ内容の本文行をエスケープする文字
pub const ESCAPE: char = '\\';

/// ファイル転送の長さプレフィクスのバイト数（u64 big-endian）
pub const FILE_LENGTH_PREFIX_LEN: usize = 8;

/// 接続先の既定アドレス
pub const DEFAULT_HOST: &str = "192.168.56.101";

/// 待ち受けの既定ポート
pub const DEFAULT_PORT: u16 = 3939;

/// 接続受付の既定タイムアウト（秒）
pub const DEFAULT_ACCEPT_TIMEOUT_SECS: u64 = 10;
