//! `/file` の送信元・受信先となるローカルファイル

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// ファイルの読み書き先
pub trait FileStore {
    /// 送信するファイルを開き、内容と長さを返す
    ///
    /// 通常ファイルでなければ `io::ErrorKind::InvalidInput`。
    fn open_regular(&self, path: &str) -> io::Result<(Box<dyn Read>, u64)>;

    /// 受信先のファイル名が既に使われているか
    fn exists(&self, name: &str) -> bool;

    /// 受信先のファイルを作る（既存なら切り詰める）
    fn create(&self, name: &str) -> io::Result<Box<dyn Write>>;
}

/// 1 つのディレクトリを基準にするファイルストア
///
/// 相対パスは `root` からの相対、絶対パスはそのまま。
/// 受信したファイルは常に `root` 直下に置く。
#[derive(Debug, Clone)]
pub struct LocalDir {
    root: PathBuf,
}

impl LocalDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalDir { root: root.into() }
    }

    /// カレントディレクトリを基準にする
    pub fn current() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for LocalDir {
    fn open_regular(&self, path: &str) -> io::Result<(Box<dyn Read>, u64)> {
        let full = self.root.join(path);
        let meta = fs::metadata(&full)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", full.display()),
            ));
        }
        let file = File::open(&full)?;
        Ok((Box::new(BufReader::new(file)), meta.len()))
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    fn create(&self, name: &str) -> io::Result<Box<dyn Write>> {
        let file = File::create(self.root.join(name))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}
