//! # pairchat-session
//!
//! ターン制チャットのコア状態機械。
//!
//! ## 概要
//!
//! 2 つのプロセスが 1 本のバイトストリームを交互に使う。ロックは使わず、
//! 「終端行を受け取った側だけが送信できる」という規約が並行制御の代わりになる。
//!
//! ### キーコンセプト
//!
//! - **ターン**: 片側が送信を許される区間。受信 → 送信 を交互に繰り返す
//! - **Identity**: 名前 + 在席状態。自分と相手の 2 つを別々に持つ
//! - **コマンド**: スラッシュで始まる入力。送信側・受信側それぞれの表で解釈する
//! - **直前のメッセージ**: `/echo` 用に最後に受信したメッセージを 1 つだけ保持
//!
//! ## セッションの状態遷移
//!
//! ```text
//! (開始側のみ) ウェルカム + ヘルプ一覧を送信
//!
//! AwaitingReceive → DispatchInbound → AwaitingSendInput → DispatchOutbound
//!        ↑                                                        │
//!        └────────────────────────────────────────────────────────┘
//!
//! /close（送信・受信どちらでも） → Closed（両端点を解放し "Bye!" を表示）
//! ```

pub mod console;
pub mod error;
pub mod identity;
pub mod interpreter;
pub mod session;
pub mod store;

pub use console::{Console, ScriptedConsole, Transcript};
pub use error::SessionError;
pub use identity::{Identity, Palette};
pub use interpreter::{Inbound, Outbound};
pub use session::{Role, Session, SessionStats, TurnState};
pub use store::{FileStore, LocalDir};

pub use pairchat_proto::{ChatConfig, Status};

/// `CLOSED` に達したときに表示する行
pub const FAREWELL: &str = "Bye!";

/// 端点が欠けていてセッションを始められないときの診断行
pub const STREAMS_INVALID: &str = "At least one of the streams is not valid";

/// 送信できない `/file` 引数に対してローカルに表示する行
pub const CANT_ACCESS_FILE: &str = "Can't Access File";
