//! スラッシュコマンドの字句解析
//!
//! キーボード入力（送信側）と受信メッセージの先頭行（受信側）の両方に
//! 同じ解析を使う。どのコマンドが実際に効果を持つかは送信・受信それぞれの
//! ディスパッチ表（`pairchat-session`）が決める。
//!
//! ## 認識規則
//!
//! ```text
//! "/name Bob"      → Name(Some("Bob"))
//! "/name"          → Name(None)          ← 名前はプレースホルダになる
//! "/namefoo"       → None                ← 先頭トークンが一致しない → 平文
//! "/status busy"   → Status(Busy)        ← 大文字小文字を区別しない
//! "/status foo"    → Status(Available)   ← 不明な値は既定値
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// 在席状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// 在席
    #[default]
    Available,
    /// 取り込み中
    Busy,
}

impl Status {
    /// `/status` の引数を解釈する
    ///
    /// `BUSY`（大文字小文字を問わない）のみ `Busy`、それ以外と引数なしは `Available`。
    pub fn from_argument(arg: Option<&str>) -> Self {
        match arg {
            Some(s) if s.eq_ignore_ascii_case("BUSY") => Status::Busy,
            _ => Status::Available,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Available => write!(f, "AVAILABLE"),
            Status::Busy => write!(f, "BUSY"),
        }
    }
}

/// 認識されたスラッシュコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/help`
    Help,
    /// `/close`
    Close,
    /// `/echo`
    Echo,
    /// `/smile`
    Smile,
    /// `/like`
    Like,
    /// `/name [X]`（引数なしは `None`）
    Name(Option<String>),
    /// `/status [AVAILABLE|BUSY]`
    Status(Status),
    /// `/file PATH`（引数なしは `None`）
    File(Option<String>),
}

impl Command {
    /// 1 行をコマンドとして解析する
    ///
    /// # 戻り値
    /// - `Some(Command)`: 先頭トークンが既知のコマンドと一致した
    /// - `None`: 平文として扱うべき行
    pub fn parse(line: &str) -> Option<Self> {
        let (token, rest) = split_token(line);
        let arg = non_empty(rest);

        let cmd = match token {
            "/help" => Command::Help,
            "/close" => Command::Close,
            "/echo" => Command::Echo,
            "/smile" => Command::Smile,
            "/like" => Command::Like,
            "/name" => Command::Name(arg.map(str::to_string)),
            "/status" => Command::Status(Status::from_argument(arg)),
            "/file" => Command::File(arg.map(str::to_string)),
            _ => return None,
        };
        Some(cmd)
    }

    /// コマンドのトークン（`/name` など）
    pub fn token(&self) -> &'static str {
        match self {
            Command::Help => "/help",
            Command::Close => "/close",
            Command::Echo => "/echo",
            Command::Smile => "/smile",
            Command::Like => "/like",
            Command::Name(_) => "/name",
            Command::Status(_) => "/status",
            Command::File(_) => "/file",
        }
    }
}

/// 先頭の空白区切りトークンと残りに分ける
fn split_token(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], &line[idx..]),
        None => (line, ""),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// `/file` の引数から末尾のパス要素（ファイル名）を取り出す
///
/// `/` と `\` の両方を区切りとみなす。空・`.`・`..` の場合は `None`。
pub fn file_name_of(path: &str) -> Option<&str> {
    let name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/close"), Some(Command::Close));
        assert_eq!(Command::parse("/echo"), Some(Command::Echo));
        assert_eq!(Command::parse("/smile"), Some(Command::Smile));
        assert_eq!(Command::parse("/like"), Some(Command::Like));
    }

    #[test]
    fn test_parse_name_with_argument() {
        assert_eq!(
            Command::parse("/name Bob"),
            Some(Command::Name(Some("Bob".to_string())))
        );
        // 名前中の空白は保持される
        assert_eq!(
            Command::parse("/name  Mary Ann "),
            Some(Command::Name(Some("Mary Ann".to_string())))
        );
    }

    #[test]
    fn test_parse_name_without_argument() {
        assert_eq!(Command::parse("/name"), Some(Command::Name(None)));
        assert_eq!(Command::parse("/name   "), Some(Command::Name(None)));
    }

    #[test]
    fn test_parse_status_variants() {
        assert_eq!(Command::parse("/status busy"), Some(Command::Status(Status::Busy)));
        assert_eq!(Command::parse("/status BuSy"), Some(Command::Status(Status::Busy)));
        assert_eq!(
            Command::parse("/status foo"),
            Some(Command::Status(Status::Available)),
            "不明な値は AVAILABLE"
        );
        assert_eq!(Command::parse("/status"), Some(Command::Status(Status::Available)));
    }

    #[test]
    fn test_parse_file() {
        assert_eq!(
            Command::parse("/file ./photo.bin"),
            Some(Command::File(Some("./photo.bin".to_string())))
        );
        assert_eq!(Command::parse("/file"), Some(Command::File(None)));
    }

    #[test]
    fn test_unknown_and_glued_tokens_are_plain_text() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/namefoo"), None);
        assert_eq!(Command::parse("/help: show this list"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/unknown arg"), None);
    }

    #[test]
    fn test_token_roundtrip() {
        for line in ["/help", "/close", "/echo", "/smile", "/like", "/name", "/status", "/file"] {
            let cmd = Command::parse(line).unwrap();
            assert_eq!(cmd.token(), line);
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Available.to_string(), "AVAILABLE");
        assert_eq!(Status::Busy.to_string(), "BUSY");
        assert_eq!(Status::default(), Status::Available);
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("./photo.bin"), Some("photo.bin"));
        assert_eq!(file_name_of("/tmp/a/b.txt"), Some("b.txt"));
        assert_eq!(file_name_of("C:\\Users\\me\\doc.pdf"), Some("doc.pdf"));
        assert_eq!(file_name_of("plain"), Some("plain"));
        assert_eq!(file_name_of("dir/"), None);
        assert_eq!(file_name_of(".."), None);
    }
}
