//! メッセージの送受信（行単位のフレーミング）
//!
//! ## Wire Format
//! ```text
//! [transform(line) "\n"] × N
//! [transform(sentinel) "\n"]      ← end_turn のときだけ
//! ```
//!
//! 受信側は行終端 `"\n"`（直前の `"\r"` も許容）で区切り、逆変換した行が
//! 終端行と一致するまで読み続ける。

use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::sync::Arc;

use pairchat_cipher::SharedTransform;
use pairchat_proto::{ConfigError, WireConfig};

use crate::error::FrameError;

/// 受信したメッセージ（順序付きの行の列）
///
/// 終端行そのものは含まない。空のメッセージ（終端行のみ）もありうる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    lines: Vec<String>,
}

impl Message {
    /// 行の列からメッセージを構築する
    pub fn new(lines: Vec<String>) -> Self {
        Message { lines }
    }

    /// 先頭行（コマンド判定に使う）
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// すべての行
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 行がないか
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 行の列に分解する
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// 行単位のメッセージ送受信器
///
/// ストリームは保持せず、呼び出しごとに受け取る。ファイル転送と同じ
/// バッファ付きリーダを共有するため（先読みしたファイルのバイトを失わない）。
pub struct Framer {
    transform: SharedTransform,
    sentinel: String,
    escape: char,
}

impl Framer {
    /// 変換とワイヤ設定から Framer を生成する
    pub fn new(wire: &WireConfig, transform: SharedTransform) -> Self {
        Framer {
            transform,
            sentinel: wire.sentinel.clone(),
            escape: wire.escape,
        }
    }

    /// ワイヤ設定の鍵でローテーション変換を作り Framer を生成する
    pub fn from_config(wire: &WireConfig) -> Result<Self, ConfigError> {
        wire.validate()?;
        let rotation = wire.rotation()?;
        Ok(Self::new(wire, Arc::new(rotation)))
    }

    /// 共有している変換
    pub fn transform(&self) -> &SharedTransform {
        &self.transform
    }

    /// 終端行
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// メッセージを送信する
    ///
    /// すべての行を先に検証してから書き込むため、`UnframeableLine` の場合は
    /// 何も書き込まれない。`end_turn` が true なら終端行を送ってフラッシュする。
    pub fn send_message<W, S>(&self, sink: &mut W, lines: &[S], end_turn: bool) -> Result<(), FrameError>
    where
        W: Write,
        S: AsRef<str>,
    {
        let sentinel = if end_turn { Some(self.encode_sentinel()?) } else { None };
        let encoded = lines
            .iter()
            .map(|l| self.encode_content(l.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for wire_line in &encoded {
            write_line(sink, wire_line)?;
        }
        log::debug!(
            "[framer] → {} line(s){}",
            encoded.len(),
            if end_turn { " + end" } else { "" }
        );

        if let Some(wire_line) = sentinel {
            write_line(sink, &wire_line)?;
            sink.flush()?;
        }
        Ok(())
    }

    /// 終端行を送信してフラッシュする（発言権を相手に渡す）
    pub fn end_turn<W: Write>(&self, sink: &mut W) -> Result<(), FrameError> {
        let wire_line = self.encode_sentinel()?;
        write_line(sink, &wire_line)?;
        sink.flush()?;
        Ok(())
    }

    /// 終端行まで読み、メッセージを返す
    ///
    /// 読み込みはブロックする（タイムアウトはこの層では扱わない）。
    ///
    /// # エラー
    /// - `FrameError::ProtocolDesync`: 終端行の前にストリームが終わった
    /// - `FrameError::Utf8`: 行が UTF-8 として不正
    pub fn receive_message<R: BufRead>(&self, source: &mut R) -> Result<Message, FrameError> {
        let mut lines = Vec::new();

        loop {
            let mut raw = Vec::new();
            let n = source.read_until(b'\n', &mut raw)?;
            if n == 0 || raw.last() != Some(&b'\n') {
                return Err(FrameError::ProtocolDesync { lines_read: lines.len() });
            }
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }

            let wire_line = String::from_utf8(raw)?;
            let line = self.transform.invert_line(&wire_line);

            if line == self.sentinel {
                break;
            }
            lines.push(self.unescape(line));
        }

        log::debug!("[framer] ← {} line(s) + end", lines.len());
        Ok(Message::new(lines))
    }

    /// 本文行を変換済みのワイヤ行にする
    fn encode_content(&self, line: &str) -> Result<String, FrameError> {
        let wire_line = self.transform.apply_line(&self.escape(line));
        if wire_line.contains(['\n', '\r']) {
            return Err(FrameError::UnframeableLine { line: line.to_string() });
        }
        Ok(wire_line)
    }

    fn encode_sentinel(&self) -> Result<String, FrameError> {
        let wire_line = self.transform.apply_line(&self.sentinel);
        if wire_line.contains(['\n', '\r']) {
            return Err(FrameError::UnframeableSentinel { sentinel: self.sentinel.clone() });
        }
        Ok(wire_line)
    }

    /// 終端行に見える本文行にエスケープ文字を 1 つ足す
    pub fn escape<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.looks_like_sentinel(line) {
            Cow::Owned(format!("{}{}", self.escape, line))
        } else {
            Cow::Borrowed(line)
        }
    }

    /// [`Framer::escape`] の逆
    pub fn unescape(&self, line: String) -> String {
        if line.starts_with(self.escape) && self.looks_like_sentinel(&line) {
            line[self.escape.len_utf8()..].to_string()
        } else {
            line
        }
    }

    /// 0 個以上のエスケープ文字 + 終端行 の形か
    fn looks_like_sentinel(&self, line: &str) -> bool {
        line.trim_start_matches(self.escape) == self.sentinel
    }
}

fn write_line<W: Write>(sink: &mut W, wire_line: &str) -> Result<(), FrameError> {
    sink.write_all(wire_line.as_bytes())?;
    sink.write_all(b"\n")?;
    Ok(())
}
