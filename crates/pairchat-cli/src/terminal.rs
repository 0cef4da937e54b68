//! 端末コンソール（rustyline で行編集）

use std::io;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use pairchat_session::Console;

/// 標準入出力のコンソール
///
/// 入力は履歴付きの行編集。表示は標準出力、診断は標準エラー。
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self, ReadlineError> {
        Ok(Terminal {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        log::debug!("[terminal] history not updated: {}", e);
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-D / Ctrl-C は会話の終了
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        }
    }

    fn show(&mut self, line: &str) {
        println!("{}", line);
    }

    fn alert(&mut self, line: &str) {
        eprintln!("{}", line.yellow());
    }
}
