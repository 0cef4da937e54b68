//! # pairchat-cli
//!
//! TCP 上で 2 人がターン制で会話するコマンドラインツール。
//!
//! ## 使用方法
//!
//! ```text
//! # 待ち受け側（最初にウェルカムとヘルプ一覧を送る）
//! pairchat listen --port 3939
//!
//! # 接続側
//! pairchat connect --host 192.168.56.101 --port 3939
//! ```
//!
//! 受け付けは既定で 10 秒待ち、誰も来なければ "Time's over" を表示して終わる。
//! `/file` で送受信するファイルは `--dir` のディレクトリに置く。

pub mod bootstrap;
pub mod client;
pub mod terminal;

pub use bootstrap::{accept_within, connect, listen, BootstrapError};
pub use client::ChatClient;
pub use terminal::Terminal;
