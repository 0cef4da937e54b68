//! 不変の設定値
//!
//! 終端行・変換鍵・表示色などの定数をプロセス全体の可変状態にせず、
//! 構築時に Framer / ファイルチャネル / セッションへ注入する。
//! JSON ファイルから読み込める（未指定のフィールドは既定値）。
//!
//! ```json
//! {
//!   "wire": { "key": 10, "sentinel": "(end)", "escape": "\\" },
//!   "local_name": "Alice",
//!   "your_color": "magenta",
//!   "its_color": "blue"
//! }
//! ```

use std::path::Path;

use pairchat_cipher::{Rotation, Transform, DEFAULT_KEY};
use serde::{Deserialize, Serialize};

use crate::canned::WELCOME;
use crate::error::ConfigError;
use crate::{ESCAPE, SENTINEL};

/// ワイヤレベルの設定（両端で一致していなければならない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// ローテーション鍵
    pub key: i32,
    /// メッセージ終端行
    pub sentinel: String,
    /// 終端行と同じ内容の本文行をエスケープする文字
    pub escape: char,
}

impl WireConfig {
    /// 設定値を検証する
    ///
    /// 変換前の値に加えて、鍵で変換した終端行・エスケープ文字・印字可能な
    /// ASCII が行終端にならないことも確かめる。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentinel.is_empty() {
            return Err(ConfigError::EmptySentinel);
        }
        if self.sentinel.starts_with(self.escape) {
            return Err(ConfigError::SentinelStartsWithEscape {
                sentinel: self.sentinel.clone(),
                escape: self.escape,
            });
        }
        single_line("wire.sentinel", &self.sentinel)?;
        if self.escape == '\n' || self.escape == '\r' {
            return Err(ConfigError::MultilineValue { field: "wire.escape" });
        }
        let rotation = Rotation::new(self.key)?;
        self.framable(&rotation, "wire.sentinel", &self.sentinel)?;
        self.framable(&rotation, "wire.escape", self.escape.encode_utf8(&mut [0; 4]))?;
        let printable: String = (' '..='~').collect();
        self.framable(&rotation, "wire.key", &printable)?;
        Ok(())
    }

    fn framable(&self, rotation: &Rotation, field: &'static str, value: &str) -> Result<(), ConfigError> {
        if rotation.apply_line(value).contains(['\n', '\r']) {
            return Err(ConfigError::UnframeableUnderKey { key: self.key, field });
        }
        Ok(())
    }

    /// 鍵からローテーション変換を生成する
    pub fn rotation(&self) -> Result<Rotation, ConfigError> {
        Ok(Rotation::new(self.key)?)
    }
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig {
            key: DEFAULT_KEY,
            sentinel: SENTINEL.to_string(),
            escape: ESCAPE,
        }
    }
}

/// チャット全体の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// ワイヤ設定
    pub wire: WireConfig,
    /// 自分の初期名
    pub local_name: String,
    /// 相手の初期名
    pub remote_name: String,
    /// `/name` に引数がないときの名前
    pub name_placeholder: String,
    /// 自分のラベルの背景色（colored の色名）
    pub your_color: String,
    /// 相手のラベルの背景色
    pub its_color: String,
    /// 同名ファイルが既にあるときの受信先ファイル名
    pub fallback_filename: String,
    /// 不正な `/file` に対して相手に送るマーカー
    pub error_marker: String,
    /// 開始側が最初に送るウェルカム行
    pub welcome: String,
}

impl ChatConfig {
    /// JSON 文字列から読み込んで検証する
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ChatConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON ファイルから読み込んで検証する
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// 設定値を検証する
    ///
    /// 送信される値（名前・マーカー・ウェルカム）は 1 行でなければならない。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wire.validate()?;
        single_line("local_name", &self.local_name)?;
        single_line("remote_name", &self.remote_name)?;
        single_line("name_placeholder", &self.name_placeholder)?;
        single_line("fallback_filename", &self.fallback_filename)?;
        single_line("error_marker", &self.error_marker)?;
        single_line("welcome", &self.welcome)?;
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            wire: WireConfig::default(),
            local_name: "You".to_string(),
            remote_name: "???".to_string(),
            name_placeholder: "???".to_string(),
            your_color: "magenta".to_string(),
            its_color: "blue".to_string(),
            fallback_filename: "file".to_string(),
            error_marker: "~*Syntax Error*~".to_string(),
            welcome: WELCOME.to_string(),
        }
    }
}

fn single_line(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains(['\n', '\r']) {
        return Err(ConfigError::MultilineValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wire.key, 10);
        assert_eq!(config.wire.sentinel, "(end)");
        assert_eq!(config.local_name, "You");
        assert_eq!(config.remote_name, "???");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ChatConfig::from_json_str(r#"{ "local_name": "Alice" }"#).unwrap();
        assert_eq!(config.local_name, "Alice");
        assert_eq!(config.wire, WireConfig::default());
        assert_eq!(config.fallback_filename, "file");
    }

    #[test]
    fn test_nested_wire_override() {
        let config =
            ChatConfig::from_json_str(r#"{ "wire": { "key": 3, "sentinel": "<<over>>" } }"#)
                .unwrap();
        assert_eq!(config.wire.key, 3);
        assert_eq!(config.wire.sentinel, "<<over>>");
        assert_eq!(config.wire.escape, '\\');
        assert_eq!(config.wire.rotation().unwrap().key(), 3);
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let result = ChatConfig::from_json_str(r#"{ "wire": { "sentinel": "" } }"#);
        assert!(matches!(result, Err(ConfigError::EmptySentinel)));
    }

    #[test]
    fn test_sentinel_starting_with_escape_rejected() {
        let result = ChatConfig::from_json_str(r#"{ "wire": { "sentinel": "\\end" } }"#);
        assert!(matches!(result, Err(ConfigError::SentinelStartsWithEscape { .. })));
    }

    #[test]
    fn test_identity_key_rejected() {
        let result = ChatConfig::from_json_str(r#"{ "wire": { "key": 256 } }"#);
        assert!(matches!(result, Err(ConfigError::Cipher(_))));
    }

    #[test]
    fn test_key_that_breaks_sentinel_rejected() {
        // 鍵 -30 は '(' を '\n' に写す
        let wire = WireConfig {
            key: -30,
            ..WireConfig::default()
        };
        assert!(matches!(
            wire.validate(),
            Err(ConfigError::UnframeableUnderKey { key: -30, field: "wire.sentinel" })
        ));
        assert!(ChatConfig::from_json_str(r#"{ "wire": { "key": -30 } }"#).is_err());
    }

    #[test]
    fn test_key_that_breaks_plain_text_rejected() {
        // 鍵 -22 は ' ' を '\n' に写す
        let wire = WireConfig {
            key: -22,
            ..WireConfig::default()
        };
        assert!(matches!(
            wire.validate(),
            Err(ConfigError::UnframeableUnderKey { field: "wire.key", .. })
        ));
    }

    #[test]
    fn test_key_that_breaks_escape_rejected() {
        // 鍵 -82 は '\\' (0x5C) を '\n' に写す
        let wire = WireConfig {
            key: -82,
            sentinel: "\u{3000}end".to_string(),
            escape: '\\',
        };
        assert!(matches!(
            wire.validate(),
            Err(ConfigError::UnframeableUnderKey { field: "wire.escape", .. })
        ));
    }

    #[test]
    fn test_multiline_name_rejected() {
        let result = ChatConfig::from_json_str(r#"{ "local_name": "a\nb" }"#);
        assert!(matches!(
            result,
            Err(ConfigError::MultilineValue { field: "local_name" })
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = ChatConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "its_color": "green", "error_marker": "!!" }}"#).unwrap();

        let config = ChatConfig::load(file.path()).unwrap();
        assert_eq!(config.its_color, "green");
        assert_eq!(config.error_marker, "!!");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ChatConfig::load("/nonexistent/pairchat.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
