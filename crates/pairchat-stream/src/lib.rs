//! # pairchat-stream
//!
//! セッションに渡す双方向バイトストリームの抽象化レイヤー
//!
//! ## 設計の背景
//!
//! 接続の確立（待ち受け・接続・受付タイムアウト）はコアの外側の責務で、
//! コアが受け取るのはバイトを読む端点と書く端点の 2 つだけ。
//! どちらかが欠けていればセッションは始めない。
//!
//! ## 構造
//!
//! ```text
//! Endpoints
//!   ├── BufReader<Counting<R>>  ← テキスト行とファイル本体を同じバッファから読む
//!   └── BufWriter<Counting<W>>  ← 終端行・ファイル送信後にフラッシュ
//! ```

pub mod endpoints;
pub mod error;

pub use endpoints::{Counting, Endpoints};
pub use error::{Side, StreamError};
