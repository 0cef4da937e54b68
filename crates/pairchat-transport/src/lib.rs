//! # pairchat-transport
//!
//! バイトストリーム上のフレーミング層。
//!
//! テキストのメッセージ（複数行）と、同じストリームに埋め込まれる
//! バイナリのファイル転送の 2 種類を扱う。
//!
//! ## メッセージの Wire Format
//!
//! ```text
//! transform(line_0) "\n"
//! transform(line_1) "\n"
//! ...
//! transform("(end)") "\n"      ← 終端行（発言権の移譲）
//! ```
//!
//! 本文行が終端行と同じ内容（"(end)", "\(end)", ...）の場合は
//! 先頭にエスケープ文字を 1 つ足して送り、受信側が 1 つ取り除く。
//!
//! ## ファイル転送の Wire Format
//!
//! ```text
//! [length: u64 BE (8 bytes)][transform(byte_0)]...[transform(byte_{length-1})]
//! ```
//!
//! ファイル本体には番兵バイトを使わない。1 バイト変換は任意の値を任意の値に
//! 写しうるため、長さプレフィクスだけが安全な区切りになる。

pub mod error;
pub mod file;
pub mod framer;

pub use error::{FileError, FrameError};
pub use file::FileChannel;
pub use framer::{Framer, Message};
