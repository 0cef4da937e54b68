//! 参加者の名前・在席状態と、表示用ラベル

use colored::{Color, Colorize};
use pairchat_proto::{ChatConfig, Status};

/// 一方の参加者の名前と在席状態
///
/// 自分用と相手用に 1 つずつ、セッションが排他的に保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub status: Status,
}

impl Identity {
    /// `AVAILABLE` で生成する
    pub fn new(name: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            status: Status::Available,
        }
    }

    /// 色なしのラベル（`"Name> "` または `"Name (Busy)> "`）
    pub fn label_text(&self) -> String {
        match self.status {
            Status::Available => format!("{}> ", self.name),
            Status::Busy => format!("{} (Busy)> ", self.name),
        }
    }

    /// 背景色付きのラベル
    pub fn render_label(&self, color: Color) -> String {
        self.label_text().on_color(color).to_string()
    }
}

/// ラベルの背景色（自分 / 相手）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub yours: Color,
    pub its: Color,
}

impl Palette {
    /// 設定の色名から生成する。解釈できない色名は既定色にする
    pub fn from_config(config: &ChatConfig) -> Self {
        Palette {
            yours: parse_color(&config.your_color, Color::Magenta),
            its: parse_color(&config.its_color, Color::Blue),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            yours: Color::Magenta,
            its: Color::Blue,
        }
    }
}

fn parse_color(name: &str, fallback: Color) -> Color {
    match name.parse::<Color>() {
        Ok(color) => color,
        Err(()) => {
            log::warn!("[session] unknown color {:?}, using {:?}", name, fallback);
            fallback
        }
    }
}
