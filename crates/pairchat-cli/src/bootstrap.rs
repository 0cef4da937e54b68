//! TCP での接続確立
//!
//! 待ち受け側は受付にタイムアウトを持つ。接続後のストリームは
//! ブロッキングに戻してからセッションへ渡す。

use std::io;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// 受付待ちのポーリング間隔
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 接続確立のエラー
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("cannot listen on port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    /// 時間内に相手が来なかった
    #[error("Time's over")]
    AcceptTimeout { waited: Duration },

    #[error("accept failed: {0}")]
    Accept(io::Error),

    #[error("cannot connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },
}

/// 全インターフェースの `port` で待ち受け、最初の 1 接続を返す
pub fn listen(port: u16, timeout: Duration) -> Result<TcpStream, BootstrapError> {
    let listener =
        TcpListener::bind(("0.0.0.0", port)).map_err(|source| BootstrapError::Bind { port, source })?;
    log::info!("[bootstrap] listening on port {}", port);
    accept_within(&listener, timeout)
}

/// 既存のリスナーで 1 接続を受け付ける
///
/// `timeout` を過ぎたら `AcceptTimeout`。
pub fn accept_within(listener: &TcpListener, timeout: Duration) -> Result<TcpStream, BootstrapError> {
    listener.set_nonblocking(true).map_err(BootstrapError::Accept)?;
    let deadline = Instant::now() + timeout;

    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false).map_err(BootstrapError::Accept)?;
                log::info!("[bootstrap] accepted {}", peer);
                return Ok(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    log::warn!("[bootstrap] nobody connected within {:?}", timeout);
                    return Err(BootstrapError::AcceptTimeout { waited: timeout });
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => return Err(BootstrapError::Accept(e)),
        }
    }
}

/// `host:port` に接続する
pub fn connect(host: &str, port: u16) -> Result<TcpStream, BootstrapError> {
    let stream = TcpStream::connect((host, port)).map_err(|source| BootstrapError::Connect {
        addr: format!("{}:{}", host, port),
        source,
    })?;
    log::info!("[bootstrap] connected to {}:{}", host, port);
    Ok(stream)
}
