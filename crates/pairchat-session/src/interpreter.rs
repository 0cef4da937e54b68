//! スラッシュコマンドの解釈
//!
//! 同じコマンドでも送る側と受け取る側で意味が違うため、表を 2 つ持つ。
//!
//! | コマンド          | 送る側                          | 受け取る側                         |
//! |-------------------|---------------------------------|------------------------------------|
//! | `/help`           | 平文として送る                  | 次の送信ターンでヘルプ一覧を返す   |
//! | `/close`          | 送ってから終了                  | 終了                               |
//! | `/echo`           | 直前の受信メッセージを送り返す  | （届かない）                       |
//! | `/smile` `/like`  | 定型のアスキーアートを送る      | （届かない）                       |
//! | `/name [N]`       | 自分の名前を変えて送る          | 相手の名前を変えて通知             |
//! | `/status [busy]`  | 自分の状態を変えて送る          | 相手の状態を変えて通知             |
//! | `/file PATH`      | 検証して送り、本体を続けて送る  | 本体を受け取ってファイルに保存     |
//! | その他            | 1 行の平文として送る            | 相手のラベル付きで各行を表示       |

use std::io::{Read, Write};

use pairchat_proto::canned::{LIKE_LINES, SMILE_LINES};
use pairchat_proto::command::file_name_of;
use pairchat_proto::{Command, Status};
use pairchat_transport::{FrameError, Message};

use crate::console::Console;
use crate::error::SessionError;
use crate::session::{Session, Step};
use crate::store::FileStore;
use crate::CANT_ACCESS_FILE;

/// 受信したメッセージの解釈（先頭行で決まる）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Help,
    Close,
    Name(Option<String>),
    Status(Status),
    /// 後ろにファイル本体が続く
    File(String),
    /// 表示するだけ
    Text,
}

impl Inbound {
    /// メッセージを分類する
    ///
    /// 空のメッセージ、未知のコマンド、送る側でしか意味のないコマンド、
    /// 引数のない `/file`（本体が続かない）は平文。
    pub fn classify(message: &Message) -> Self {
        match message.first_line().and_then(Command::parse) {
            Some(Command::Help) => Inbound::Help,
            Some(Command::Close) => Inbound::Close,
            Some(Command::Name(name)) => Inbound::Name(name),
            Some(Command::Status(status)) => Inbound::Status(status),
            Some(Command::File(Some(path))) => Inbound::File(path),
            Some(Command::File(None))
            | Some(Command::Echo)
            | Some(Command::Smile)
            | Some(Command::Like)
            | None => Inbound::Text,
        }
    }
}

/// キーボードから入力した行の解釈
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Close,
    Echo,
    Smile,
    Like,
    Name(Option<String>),
    Status(Status),
    File(Option<String>),
    /// そのまま送る（`/help` を含む）
    Text,
}

impl Outbound {
    pub fn classify(line: &str) -> Self {
        match Command::parse(line) {
            Some(Command::Close) => Outbound::Close,
            Some(Command::Echo) => Outbound::Echo,
            Some(Command::Smile) => Outbound::Smile,
            Some(Command::Like) => Outbound::Like,
            Some(Command::Name(name)) => Outbound::Name(name),
            Some(Command::Status(status)) => Outbound::Status(status),
            Some(Command::File(path)) => Outbound::File(path),
            Some(Command::Help) | None => Outbound::Text,
        }
    }
}

impl<R: Read, W: Write, C: Console, F: FileStore> Session<R, W, C, F> {
    /// 受信したメッセージを解釈する
    pub(crate) fn dispatch_inbound(&mut self, message: Message) -> Result<Step, SessionError> {
        let action = Inbound::classify(&message);
        log::debug!("[interpreter] inbound {:?}", action);

        match action {
            Inbound::Help => self.pending_help = true,
            Inbound::Close => {
                self.terminated = true;
                return Ok(Step::Closed);
            }
            Inbound::Name(name) => {
                let label = self.its_label();
                self.remote.name = name.unwrap_or_else(|| self.config.name_placeholder.clone());
                let notice = format!("{}changed its name in {}", label, self.remote.name);
                self.console.show(&notice);
            }
            Inbound::Status(status) => {
                self.remote.status = status;
                let notice = format!("{}changed its status", self.its_label());
                self.console.show(&notice);
            }
            Inbound::File(path) => self.receive_file(&path)?,
            Inbound::Text => {
                let label = self.its_label();
                for line in message.lines() {
                    self.console.show(&format!("{}{}", label, line));
                }
            }
        }
        Ok(Step::AwaitingSendInput)
    }

    /// 入力行を解釈して送る
    ///
    /// 変換できない文字を含む行は何も送らずに入力をやり直す。
    pub(crate) fn dispatch_outbound(&mut self, line: &str) -> Result<Step, SessionError> {
        match self.perform_outbound(line) {
            Ok(()) => {}
            Err(SessionError::Frame(FrameError::UnframeableLine { line })) => {
                log::warn!("[interpreter] refusing to send {:?}", line);
                self.console
                    .alert(&format!("Can't send {:?}: it contains characters that cannot be framed", line));
                return Ok(Step::AwaitingSendInput);
            }
            Err(e) => return Err(e),
        }

        if self.terminated {
            Ok(Step::Closed)
        } else {
            Ok(Step::AwaitingReceive)
        }
    }

    fn perform_outbound(&mut self, line: &str) -> Result<(), SessionError> {
        let action = Outbound::classify(line);
        log::debug!("[interpreter] outbound {:?}", action);

        match action {
            Outbound::Close => {
                self.send(&[line], true)?;
                self.terminated = true;
            }
            Outbound::Echo => self.echo()?,
            Outbound::Smile => self.send(&SMILE_LINES, true)?,
            Outbound::Like => self.send(&LIKE_LINES, true)?,
            Outbound::Name(name) => {
                self.send(&[line], true)?;
                self.local.name = name.unwrap_or_else(|| self.config.name_placeholder.clone());
            }
            Outbound::Status(status) => {
                self.send(&[line], true)?;
                self.local.status = status;
            }
            Outbound::File(None) => {
                let notice = format!("{}{}", self.your_label(), self.config.error_marker);
                self.console.show(&notice);
                self.send_error_marker()?;
            }
            Outbound::File(Some(path)) => self.send_file(line, &path)?,
            Outbound::Text => self.send(&[line], true)?,
        }
        Ok(())
    }

    /// 直前の受信メッセージを送り返す
    ///
    /// 次のコマンドは送り返さず、代わりにエラーマーカーを送る。
    /// - `/file`: 相手は来ない本体を待つことになる
    /// - `/name` `/status`: 相手の記録する自分の Identity だけが変わり、両端で食い違う
    fn echo(&mut self) -> Result<(), SessionError> {
        match Inbound::classify(&self.last_message) {
            Inbound::File(_) | Inbound::Name(_) | Inbound::Status(_) => {
                let first = self.last_message.first_line().unwrap_or_default().to_string();
                self.console.alert(&format!("Can't echo {:?}", first));
                self.send_error_marker()?;
                return Ok(());
            }
            _ => {}
        }
        let lines = self.last_message.lines().to_vec();
        self.send(lines.as_slice(), true)?;
        Ok(())
    }

    fn send_error_marker(&mut self) -> Result<(), FrameError> {
        let marker = [self.config.error_marker.clone()];
        self.send(&marker, true)
    }

    /// `/file PATH` を送る: コマンド行（終端あり）に続けてファイル本体
    fn send_file(&mut self, line: &str, path: &str) -> Result<(), SessionError> {
        let (source, size) = match self.store.open_regular(path) {
            Ok(opened) => opened,
            Err(e) => {
                log::info!("[interpreter] cannot send {:?}: {}", path, e);
                let notice = format!("{}{}", self.your_label(), CANT_ACCESS_FILE);
                self.console.show(&notice);
                self.send_error_marker()?;
                return Ok(());
            }
        };

        self.send(&[line], true)?;
        match self.files.send_file(self.endpoints.writer(), source, size) {
            Ok(()) => {
                self.stats.files_sent += 1;
                log::info!("[interpreter] sent {:?} ({} byte(s))", path, size);
            }
            Err(e) if e.is_fatal() => return Err(SessionError::FileStream(e)),
            Err(e) => {
                log::warn!("[interpreter] {:?} was padded: {}", path, e);
                self.console.alert(&format!("Couldn't read {}: {}", path, e));
            }
        }
        Ok(())
    }

    /// `/file PATH` を受け取る
    ///
    /// 保存先は PATH の末尾要素。空や既存の名前なら代替名に保存する。
    /// 保存先を開けなくても本体は読み捨ててストリームの同期を保つ。
    fn receive_file(&mut self, path: &str) -> Result<(), SessionError> {
        let label = self.its_label();
        let fallback = self.config.fallback_filename.clone();
        // 改名した場合は改名の通知だけを出す
        let (target, renamed) = match file_name_of(path) {
            Some(name) if !self.store.exists(name) => (name.to_string(), false),
            Some(_) => {
                self.console.show(&format!(
                    "{}The file already exists: renaming it to \"{}\"",
                    label, fallback
                ));
                (fallback, true)
            }
            None => (fallback, false),
        };

        let sink = match self.store.create(&target) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("[interpreter] cannot create {:?}: {}", target, e);
                self.console
                    .alert(&format!("Couldn't save \"{}\": {}", target, e));
                self.files
                    .discard_file(self.endpoints.reader())
                    .map_err(SessionError::FileStream)?;
                return Ok(());
            }
        };

        match self.files.receive_file(self.endpoints.reader(), sink) {
            Ok(size) => {
                self.stats.files_received += 1;
                log::info!("[interpreter] received {:?} ({} byte(s))", target, size);
                if !renamed {
                    self.console.show(&format!("{}{} received", label, target));
                }
            }
            Err(e) if e.is_fatal() => return Err(SessionError::FileStream(e)),
            Err(e) => {
                log::warn!("[interpreter] {:?} is incomplete: {}", target, e);
                self.console
                    .alert(&format!("Couldn't save \"{}\": {}", target, e));
            }
        }
        Ok(())
    }
}
