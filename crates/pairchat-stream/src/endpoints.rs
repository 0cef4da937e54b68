//! 双方向ストリームの端点

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;

use crate::error::{Side, StreamError};

/// 通過したバイト数を数えるラッパー
///
/// `Read` / `Write` の両方に使える。統計用。
#[derive(Debug)]
pub struct Counting<T> {
    inner: T,
    count: u64,
}

impl<T> Counting<T> {
    /// ラップする
    pub fn new(inner: T) -> Self {
        Counting { inner, count: 0 }
    }

    /// これまでに通過したバイト数
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<T: Read> Read for Counting<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

impl<T: Write> Write for Counting<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// セッションに渡す読み書き端点の組
///
/// ## 責任
/// - 読み込み側をバッファリングする。テキスト行もファイル本体も必ずこの
///   1 つのバッファから読むため、行読みの先読みでファイルのバイトを失わない
/// - 書き込み側をバッファリングする。フラッシュのタイミングは上位（Framer）が決める
/// - 送受信バイト数を数える
pub struct Endpoints<R: Read, W: Write> {
    reader: BufReader<Counting<R>>,
    writer: BufWriter<Counting<W>>,
}

impl<R: Read, W: Write> Endpoints<R, W> {
    /// 端点の組を作る
    ///
    /// # エラー
    /// - `StreamError::ConnectionUnavailable`: どちらか（または両方）が `None`
    pub fn new(reader: Option<R>, writer: Option<W>) -> Result<Self, StreamError> {
        match (reader, writer) {
            (Some(r), Some(w)) => Ok(Endpoints {
                reader: BufReader::new(Counting::new(r)),
                writer: BufWriter::new(Counting::new(w)),
            }),
            (None, Some(_)) => Err(StreamError::ConnectionUnavailable { side: Side::Source }),
            (Some(_), None) => Err(StreamError::ConnectionUnavailable { side: Side::Sink }),
            (None, None) => Err(StreamError::ConnectionUnavailable { side: Side::Both }),
        }
    }

    /// 読み込み端点
    pub fn reader(&mut self) -> &mut BufReader<Counting<R>> {
        &mut self.reader
    }

    /// 書き込み端点
    pub fn writer(&mut self) -> &mut BufWriter<Counting<W>> {
        &mut self.writer
    }

    /// 受信した総バイト数（バッファに先読みした分を含む）
    pub fn total_received_bytes(&self) -> u64 {
        self.reader.get_ref().count()
    }

    /// 送信した総バイト数（内側の端点に書き出し済みの分）
    pub fn total_sent_bytes(&self) -> u64 {
        self.writer.get_ref().count()
    }

    /// 未送信のデータをフラッシュして両端点を解放する
    pub fn close(mut self) -> io::Result<()> {
        let result = self.writer.flush();
        log::debug!(
            "[stream] closed (sent {} byte(s), received {} byte(s))",
            self.total_sent_bytes(),
            self.total_received_bytes()
        );
        result
    }
}

impl Endpoints<TcpStream, TcpStream> {
    /// 接続済みの TCP ストリームから端点の組を作る
    ///
    /// 書き込み側の複製に失敗した場合は `ConnectionUnavailable`。
    pub fn from_tcp(stream: TcpStream) -> Result<Self, StreamError> {
        let writer = match stream.try_clone() {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("[stream] cannot clone tcp stream for writing: {}", e);
                None
            }
        };
        Self::new(Some(stream), writer)
    }
}
