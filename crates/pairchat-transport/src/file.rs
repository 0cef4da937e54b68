//! ストリーム埋め込みのファイル転送
//!
//! ## Wire Format
//! ```text
//! [length: u64 BE (8 bytes)][transform(byte) × length]
//! ```
//!
//! 長さプレフィクスは変換しない。受信側は値に関係なく必ず `length` バイトを読む。
//! ローカルのファイル I/O が途中で失敗しても、送信側はゼロ埋めで、
//! 受信側は読み捨てで `length` バイトを守り、ストリームの同期を保つ。

use std::io::{self, Read, Write};

use pairchat_cipher::SharedTransform;
use pairchat_proto::FILE_LENGTH_PREFIX_LEN;

use crate::error::FileError;

/// 一度に読み書きするバイト数
const CHUNK_LEN: usize = 8 * 1024;

/// ファイル送受信チャネル
pub struct FileChannel {
    transform: SharedTransform,
}

impl FileChannel {
    /// 変換を共有してチャネルを生成する
    pub fn new(transform: SharedTransform) -> Self {
        FileChannel { transform }
    }

    /// ファイルの内容をストリームに送る
    ///
    /// # 引数
    /// - `stream`: チャットのストリーム（送信側）
    /// - `source`: ファイルの内容
    /// - `size`: 送信するバイト数（長さプレフィクスになる）
    ///
    /// # エラー
    /// - `FileError::Stream`: ストリームへの書き込み失敗（致命的）
    /// - `FileError::Source`: `source` の読み込み失敗、または `size` より短かった。
    ///   この場合も残りはゼロバイト（変換済み）で埋めて送信済み
    pub fn send_file<W: Write, R: Read>(
        &self,
        stream: &mut W,
        source: R,
        size: u64,
    ) -> Result<(), FileError> {
        stream
            .write_all(&size.to_be_bytes())
            .map_err(FileError::Stream)?;

        let mut source = source.take(size);
        let mut buf = [0u8; CHUNK_LEN];
        let mut sent: u64 = 0;
        let mut source_error = None;

        while sent < size {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    source_error = Some(e);
                    break;
                }
            };
            self.transform.apply_bytes(&mut buf[..n]);
            stream.write_all(&buf[..n]).map_err(FileError::Stream)?;
            sent += n as u64;
        }

        if sent < size {
            log::warn!("[file] source ended after {} of {} byte(s); padding", sent, size);
            self.write_padding(stream, size - sent)?;
        }
        stream.flush().map_err(FileError::Stream)?;
        log::debug!("[file] → {} byte(s)", size);

        match source_error {
            Some(e) => Err(FileError::Source(e)),
            None if sent < size => Err(FileError::Source(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank to {} of {} announced byte(s)", sent, size),
            ))),
            None => Ok(()),
        }
    }

    /// ストリームからファイルを受け取り `sink` に書く
    ///
    /// # 戻り値
    /// 受信したバイト数（長さプレフィクスの値）
    ///
    /// # エラー
    /// - `FileError::Stream`: ストリームの読み込み失敗・途中終了（致命的）。
    ///   `sink` には途中までの内容が残る
    /// - `FileError::Sink`: `sink` への書き込み失敗。残りは読み捨て済み
    pub fn receive_file<R: Read, W: Write>(&self, stream: &mut R, mut sink: W) -> Result<u64, FileError> {
        let mut len_buf = [0u8; FILE_LENGTH_PREFIX_LEN];
        stream.read_exact(&mut len_buf).map_err(FileError::Stream)?;
        let size = u64::from_be_bytes(len_buf);

        let mut remaining = size;
        let mut buf = [0u8; CHUNK_LEN];
        let mut sink_error = None;

        while remaining > 0 {
            let want = remaining.min(CHUNK_LEN as u64) as usize;
            stream.read_exact(&mut buf[..want]).map_err(FileError::Stream)?;
            remaining -= want as u64;

            if sink_error.is_some() {
                continue;
            }
            self.transform.invert_bytes(&mut buf[..want]);
            if let Err(e) = sink.write_all(&buf[..want]) {
                log::warn!("[file] sink write failed; draining {} byte(s)", remaining);
                sink_error = Some(e);
            }
        }

        if sink_error.is_none() {
            sink_error = sink.flush().err();
        }
        log::debug!("[file] ← {} byte(s)", size);

        match sink_error {
            Some(e) => Err(FileError::Sink(e)),
            None => Ok(size),
        }
    }

    /// ファイルを受け取って捨てる（受信先を開けなかったとき用）
    pub fn discard_file<R: Read>(&self, stream: &mut R) -> Result<u64, FileError> {
        self.receive_file(stream, io::sink())
    }

    fn write_padding<W: Write>(&self, stream: &mut W, mut remaining: u64) -> Result<(), FileError> {
        let pad = [self.transform.apply_byte(0); CHUNK_LEN];
        while remaining > 0 {
            let n = remaining.min(CHUNK_LEN as u64) as usize;
            stream.write_all(&pad[..n]).map_err(FileError::Stream)?;
            remaining -= n as u64;
        }
        Ok(())
    }
}
