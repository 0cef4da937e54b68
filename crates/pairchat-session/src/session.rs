//! セッション状態機械
//!
//! 受信 → 解釈 → 入力 → 解釈 のターンを `Closed` まで繰り返す。
//! 各ターンの中身（コマンドの解釈）は `interpreter` モジュールが担当する。

use std::io::{Read, Write};
use std::sync::Arc;

use pairchat_proto::canned::HELP_LINES;
use pairchat_proto::{ChatConfig, Command};
use pairchat_stream::Endpoints;
use pairchat_transport::{FileChannel, FrameError, Framer, Message};
use serde::Serialize;

use crate::console::Console;
use crate::error::SessionError;
use crate::identity::{Identity, Palette};
use crate::store::FileStore;
use crate::{FAREWELL, STREAMS_INVALID};

/// 接続での役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 接続を受け付けた側。ウェルカムを送り、最初の送信ターンを持つ
    Initiator,
    /// 接続した側。最初は受信から始める
    Responder,
}

/// ターンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// 相手のメッセージを待っている
    AwaitingReceive,
    /// 受信したメッセージを解釈する
    DispatchInbound,
    /// ローカルの入力を待っている（送信ターン）
    AwaitingSendInput,
    /// 入力行を解釈して送る
    DispatchOutbound,
    /// 終了
    Closed,
}

/// 状態 + 次の処理に渡すデータ
#[derive(Debug)]
pub(crate) enum Step {
    AwaitingReceive,
    DispatchInbound(Message),
    AwaitingSendInput,
    DispatchOutbound(String),
    Closed,
}

impl Step {
    fn state(&self) -> TurnState {
        match self {
            Step::AwaitingReceive => TurnState::AwaitingReceive,
            Step::DispatchInbound(_) => TurnState::DispatchInbound,
            Step::AwaitingSendInput => TurnState::AwaitingSendInput,
            Step::DispatchOutbound(_) => TurnState::DispatchOutbound,
            Step::Closed => TurnState::Closed,
        }
    }
}

/// セッション統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// 送ったメッセージ数（終端行の数）
    pub messages_sent: u64,
    /// 受け取ったメッセージ数
    pub messages_received: u64,
    /// 送った本文行の数
    pub lines_sent: u64,
    /// 受け取った本文行の数
    pub lines_received: u64,
    /// 送ったファイルの数
    pub files_sent: u64,
    /// 受け取ったファイルの数
    pub files_received: u64,
    /// ストリームに書き出したバイト数
    pub bytes_sent: u64,
    /// ストリームから読んだバイト数
    pub bytes_received: u64,
}

/// チャットセッション
///
/// ## 責任
/// - ターン状態の管理（受信と送信が交互になる）
/// - 自分と相手の Identity、直前の受信メッセージの保持
/// - 終了時に端点を解放してお別れの行を表示する
///
/// ストリームの読み書き・端末・ファイルシステムはすべて注入される。
pub struct Session<R: Read, W: Write, C: Console, F: FileStore> {
    pub(crate) endpoints: Endpoints<R, W>,
    pub(crate) framer: Framer,
    pub(crate) files: FileChannel,
    pub(crate) config: ChatConfig,
    pub(crate) palette: Palette,
    pub(crate) console: C,
    pub(crate) store: F,
    pub(crate) local: Identity,
    pub(crate) remote: Identity,
    /// `/echo` で送り返す直前の受信メッセージ
    pub(crate) last_message: Message,
    /// `/close` を送ったか受け取った
    pub(crate) terminated: bool,
    /// 受信した `/help` への返信（ヘルプ一覧）が次の送信ターンで待っている
    pub(crate) pending_help: bool,
    pub(crate) stats: SessionStats,
    role: Role,
    greeted: bool,
    step: Step,
}

impl<R: Read, W: Write, C: Console, F: FileStore> Session<R, W, C, F> {
    /// 端点の組からセッションを生成する
    ///
    /// # エラー
    /// - `SessionError::Config`: 設定値が不正
    pub fn new(
        endpoints: Endpoints<R, W>,
        config: ChatConfig,
        role: Role,
        console: C,
        store: F,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let framer = Framer::from_config(&config.wire)?;
        let files = FileChannel::new(Arc::clone(framer.transform()));
        let palette = Palette::from_config(&config);

        Ok(Session {
            endpoints,
            framer,
            files,
            palette,
            console,
            store,
            local: Identity::new(config.local_name.clone()),
            remote: Identity::new(config.remote_name.clone()),
            last_message: Message::default(),
            terminated: false,
            pending_help: false,
            stats: SessionStats::default(),
            role,
            greeted: false,
            step: Step::AwaitingReceive,
            config,
        })
    }

    /// 生の読み書き端点からセッションを生成する
    ///
    /// どちらかが `None` ならループを始めず、オペレーターに知らせて
    /// `SessionError::Stream` を返す。
    pub fn open(
        reader: Option<R>,
        writer: Option<W>,
        config: ChatConfig,
        role: Role,
        mut console: C,
        store: F,
    ) -> Result<Self, SessionError> {
        let endpoints = match Endpoints::new(reader, writer) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                log::error!("[session] {}", e);
                console.alert(STREAMS_INVALID);
                return Err(e.into());
            }
        };
        Self::new(endpoints, config, role, console, store)
    }

    /// 現在のターン状態
    pub fn state(&self) -> TurnState {
        self.step.state()
    }

    /// 自分の Identity
    pub fn local(&self) -> &Identity {
        &self.local
    }

    /// 相手の Identity
    pub fn remote(&self) -> &Identity {
        &self.remote
    }

    /// 直前に受信したメッセージ
    pub fn last_message(&self) -> &Message {
        &self.last_message
    }

    /// 統計情報を取得（デバッグ用）
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            bytes_sent: self.endpoints.total_sent_bytes(),
            bytes_received: self.endpoints.total_received_bytes(),
            ..self.stats.clone()
        }
    }

    /// 開始側の最初の送信: ウェルカム行（終端なし）に続けてヘルプ一覧（終端あり）
    ///
    /// 2 回目以降の呼び出しは何もしない。
    pub fn greet(&mut self) -> Result<(), SessionError> {
        if self.greeted {
            return Ok(());
        }
        let welcome = [self.config.welcome.clone()];
        self.send(&welcome, false)?;
        self.send(&HELP_LINES, true)?;
        self.greeted = true;
        log::info!("[session] greeted the peer");
        Ok(())
    }

    /// 状態機械を 1 段進め、遷移後の状態を返す
    ///
    /// エラーの場合は `Closed` になる。
    pub fn step(&mut self) -> Result<TurnState, SessionError> {
        let current = std::mem::replace(&mut self.step, Step::Closed);
        let from = current.state();
        let next = match current {
            Step::AwaitingReceive => self.await_receive()?,
            Step::DispatchInbound(message) => self.dispatch_inbound(message)?,
            Step::AwaitingSendInput => self.await_send_input()?,
            Step::DispatchOutbound(line) => self.dispatch_outbound(&line)?,
            Step::Closed => Step::Closed,
        };
        log::trace!("[session] {:?} -> {:?}", from, next.state());
        self.step = next;
        Ok(self.state())
    }

    /// `Closed` まで動かし、端点を解放する
    ///
    /// 正常終了ならお別れの行を表示して統計を返す。
    /// エラーでも端点は解放し、オペレーターにエラーを表示する。
    pub fn run(mut self) -> Result<SessionStats, SessionError> {
        let outcome = self.drive();
        let stats = self.stats();
        match serde_json::to_string(&stats) {
            Ok(json) => log::debug!("[session] stats {}", json),
            Err(e) => log::warn!("[session] cannot serialize stats: {}", e),
        }

        let Session {
            endpoints,
            mut console,
            ..
        } = self;
        if let Err(e) = endpoints.close() {
            log::warn!("[session] failed to flush on close: {}", e);
        }

        match outcome {
            Ok(()) => {
                console.show(FAREWELL);
                log::info!("[session] closed");
                Ok(stats)
            }
            Err(e) => {
                log::error!("[session] aborted: {}", e);
                console.alert(&e.to_string());
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<(), SessionError> {
        if self.role == Role::Initiator {
            self.greet()?;
        }
        while self.step()? != TurnState::Closed {}
        Ok(())
    }

    fn await_receive(&mut self) -> Result<Step, SessionError> {
        if self.terminated {
            return Ok(Step::Closed);
        }
        let message = self.framer.receive_message(self.endpoints.reader())?;
        self.stats.messages_received += 1;
        self.stats.lines_received += message.len() as u64;
        self.last_message = message.clone();
        Ok(Step::DispatchInbound(message))
    }

    fn await_send_input(&mut self) -> Result<Step, SessionError> {
        if self.pending_help {
            self.pending_help = false;
            self.send(&HELP_LINES, true)?;
            log::debug!("[session] replied to /help with the command list");
            return Ok(Step::AwaitingReceive);
        }

        let prompt = self.your_label();
        match self.console.read_line(&prompt).map_err(SessionError::Console)? {
            Some(line) => Ok(Step::DispatchOutbound(line)),
            None => {
                log::info!("[session] keyboard input ended, closing");
                Ok(Step::DispatchOutbound(Command::Close.token().to_string()))
            }
        }
    }

    /// 本文行を送る。`end_turn` なら終端行も送って発言権を渡す
    pub(crate) fn send<S: AsRef<str>>(&mut self, lines: &[S], end_turn: bool) -> Result<(), FrameError> {
        self.framer
            .send_message(self.endpoints.writer(), lines, end_turn)?;
        self.stats.lines_sent += lines.len() as u64;
        if end_turn {
            self.stats.messages_sent += 1;
        }
        Ok(())
    }

    pub(crate) fn your_label(&self) -> String {
        self.local.render_label(self.palette.yours)
    }

    pub(crate) fn its_label(&self) -> String {
        self.remote.render_label(self.palette.its)
    }
}
