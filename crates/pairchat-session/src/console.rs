//! オペレーターとのやりとり（キーボード入力と画面表示）
//!
//! セッションは端末に直接触らず、このトレイト越しに入出力する。
//! 実端末の実装は pairchat-cli、テスト用の台本実装はここにある。

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// ローカルの入出力
pub trait Console {
    /// プロンプトを出して 1 行読む
    ///
    /// 行末の改行は含めない。入力が終わっていれば `Ok(None)`。
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// 1 行表示する
    fn show(&mut self, line: &str);

    /// 診断メッセージを表示する
    fn alert(&mut self, line: &str);
}

/// 台本コンソールが記録した入出力
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// `read_line` に渡されたプロンプト
    pub prompts: Vec<String>,
    /// `show` された行
    pub shown: Vec<String>,
    /// `alert` された行
    pub alerts: Vec<String>,
}

/// 決められた入力を順に返し、出力を記録するコンソール
///
/// 記録は共有ハンドルなので、別スレッドでセッションを動かしたあとも
/// `transcript()` のクローンから読める。
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    transcript: Arc<Mutex<Transcript>>,
}

impl ScriptedConsole {
    /// 入力行の台本から生成する。台本が尽きると入力終了になる
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Arc::default(),
        }
    }

    /// 記録への共有ハンドル
    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    /// 現時点の記録のコピー
    pub fn snapshot(&self) -> Transcript {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.lock().prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn show(&mut self, line: &str) {
        self.lock().shown.push(line.to_string());
    }

    fn alert(&mut self, line: &str) {
        self.lock().alerts.push(line.to_string());
    }
}
