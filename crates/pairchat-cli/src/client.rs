//! 接続済みの TCP ストリームでチャットを行う
//!
//! 各レイヤーを組み合わせる主エントリポイント。
//!
//! ```text
//! ChatClient
//!   ├── Endpoints  (pairchat-stream)    - TCP の読み書き端点
//!   └── Session    (pairchat-session)   - ターン状態機械
//!         ├── Framer / FileChannel (pairchat-transport)
//!         └── Rotation             (pairchat-cipher)
//! ```

use std::net::TcpStream;

use pairchat_proto::ChatConfig;
use pairchat_session::{
    Console, LocalDir, Role, Session, SessionError, SessionStats, STREAMS_INVALID,
};
use pairchat_stream::Endpoints;

/// チャットクライアント
///
/// 設定とファイルの置き場所を持ち、接続ごとにセッションを 1 つ動かす。
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ChatConfig,
    store: LocalDir,
}

impl ChatClient {
    pub fn new(config: ChatConfig, store: LocalDir) -> Self {
        ChatClient { config, store }
    }

    /// `stream` で `/close` まで会話する
    ///
    /// # エラー
    /// - `SessionError::Stream`: ストリームを読み書き用に分けられなかった
    /// - その他: セッションが異常終了した（端点は解放済み）
    pub fn run<C: Console>(
        &self,
        stream: TcpStream,
        role: Role,
        mut console: C,
    ) -> Result<SessionStats, SessionError> {
        match stream.peer_addr() {
            Ok(peer) => log::info!("[client] chatting with {} as {:?}", peer, role),
            Err(e) => log::debug!("[client] peer address unknown: {}", e),
        }

        let endpoints = match Endpoints::from_tcp(stream) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                console.alert(STREAMS_INVALID);
                return Err(e.into());
            }
        };
        let session = Session::new(endpoints, self.config.clone(), role, console, self.store.clone())?;
        session.run()
    }
}
