//! pairchat 統合テスト
//!
//! bootstrap + stream + transport + session の完全なパイプラインを
//! TCP ループバック上の 2 スレッド（2 プロセスの代わり）でテストする。

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::Duration;

use pairchat_cipher::{Rotation, Transform};
use pairchat_cli::{accept_within, connect, ChatClient};
use pairchat_proto::canned::{HELP_LINES, WELCOME};
use pairchat_proto::ChatConfig;
use pairchat_session::{
    LocalDir, Role, ScriptedConsole, SessionError, SessionStats, Transcript, FAREWELL,
};
use pairchat_transport::FrameError;

// ==============================================================
// ヘルパー
// ==============================================================

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// 片側の結果
struct Outcome {
    result: Result<SessionStats, SessionError>,
    transcript: Transcript,
}

fn client(dir: &Path) -> ChatClient {
    ChatClient::new(ChatConfig::default(), LocalDir::new(dir))
}

fn run_side(client: ChatClient, stream: TcpStream, role: Role, inputs: &[&str]) -> Outcome {
    let console = ScriptedConsole::new(inputs.iter().copied());
    let result = client.run(stream, role, console.clone());
    Outcome {
        result,
        transcript: console.snapshot(),
    }
}

/// 待ち受け側（開始側）と接続側をそれぞれのスレッドで動かす
fn converse(
    initiator_dir: &Path,
    initiator_inputs: &[&str],
    responder_dir: &Path,
    responder_inputs: &[&str],
) -> (Outcome, Outcome) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let responder_client = client(responder_dir);
    let responder_inputs: Vec<String> = responder_inputs.iter().map(|s| s.to_string()).collect();
    let responder = thread::spawn(move || {
        let stream = connect("127.0.0.1", port).unwrap();
        let inputs: Vec<&str> = responder_inputs.iter().map(String::as_str).collect();
        run_side(responder_client, stream, Role::Responder, &inputs)
    });

    let stream = accept_within(&listener, ACCEPT_TIMEOUT).unwrap();
    let initiator = run_side(client(initiator_dir), stream, Role::Initiator, initiator_inputs);
    let responder = responder.join().unwrap();
    (initiator, responder)
}

fn wire_line(line: &str) -> String {
    Rotation::default().apply_line(line)
}

// ==============================================================
// 会話のシナリオ
// ==============================================================

#[test]
fn test_full_conversation_with_file_transfer() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let data: Vec<u8> = (0..1000u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
    std::fs::write(dir_b.path().join("photo.bin"), &data).unwrap();

    // 開始側: 挨拶 → /name Bob 受信 → "hi Bob" → ファイル受信 → /close
    // 応答側: 挨拶受信 → /name Bob → "hi Bob" 受信 → /file → /close 受信
    let (a, b) = converse(
        dir_a.path(),
        &["hi Bob", "/close"],
        dir_b.path(),
        &["/name Bob", "/file ./photo.bin"],
    );

    let a_stats = a.result.unwrap();
    let b_stats = b.result.unwrap();

    // 応答側はウェルカムとヘルプ一覧を相手のラベル付きで表示する
    assert!(b.transcript.shown[0].ends_with(WELCOME), "最初の行はウェルカム");
    for (shown, help) in b.transcript.shown[1..=HELP_LINES.len()].iter().zip(HELP_LINES) {
        assert!(shown.ends_with(help), "ヘルプ一覧が順に表示される");
    }

    // 開始側の相手の名前は Bob になる（以降のラベルにも反映）
    assert!(a.transcript.shown[0].ends_with("changed its name in Bob"));
    assert!(a.transcript.shown[1].contains("Bob> "), "受信通知は新しい名前のラベル");
    assert!(a.transcript.shown[1].ends_with("photo.bin received"));

    // ファイルは 1000 バイトがそのまま届く
    let received = std::fs::read(dir_a.path().join("photo.bin")).unwrap();
    assert_eq!(received.len(), 1000);
    assert_eq!(received, data, "変換を往復したファイルは元と一致する");
    assert_eq!(b_stats.files_sent, 1);
    assert_eq!(a_stats.files_received, 1);

    // 両側とも CLOSED に達してお別れを表示する
    assert_eq!(a.transcript.shown.last().map(String::as_str), Some(FAREWELL));
    assert_eq!(b.transcript.shown.last().map(String::as_str), Some(FAREWELL));

    // 送ったメッセージ数と受け取ったメッセージ数は対になる
    assert_eq!(a_stats.messages_sent, b_stats.messages_received);
    assert_eq!(b_stats.messages_sent, a_stats.messages_received);
    assert_eq!(b_stats.bytes_sent, a_stats.bytes_received);
}

#[test]
fn test_turns_alternate_one_prompt_per_turn() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let (a, b) = converse(
        dir_a.path(),
        &["a1", "a2"],
        dir_b.path(),
        &["b1", "b2", "/close"],
    );
    a.result.unwrap();
    b.result.unwrap();

    // 開始側: 挨拶 → b1 受信 → a1 → b2 受信 → a2 → /close 受信
    assert_eq!(a.transcript.prompts.len(), 2);
    // 応答側: 挨拶受信 → b1 → a1 受信 → b2 → a2 受信 → /close
    assert_eq!(b.transcript.prompts.len(), 3);

    let a_text: Vec<&String> = a
        .transcript
        .shown
        .iter()
        .filter(|l| l.ends_with("b1") || l.ends_with("b2"))
        .collect();
    assert_eq!(a_text.len(), 2);
    assert!(a_text[0].ends_with("b1"));
    assert!(a_text[1].ends_with("b2"));
}

#[test]
fn test_help_request_answered_without_keyboard() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let (a, b) = converse(dir_a.path(), &[], dir_b.path(), &["/help", "/close"]);
    a.result.unwrap();
    b.result.unwrap();

    assert!(a.transcript.prompts.is_empty(), "ヘルプ一覧の返信に入力は要らない");
    // 挨拶(1 + 8) + 返信のヘルプ一覧(8) + お別れ
    assert_eq!(b.transcript.shown.len(), 1 + HELP_LINES.len() * 2 + 1);
    assert!(b.transcript.shown[1 + HELP_LINES.len()].ends_with(HELP_LINES[0]));
}

#[test]
fn test_sentinel_text_survives_round_trip() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let (a, b) = converse(
        dir_a.path(),
        &["got it"],
        dir_b.path(),
        &["(end)", "/close"],
    );
    a.result.unwrap();
    b.result.unwrap();

    assert!(
        a.transcript.shown.iter().any(|l| l.ends_with("(end)")),
        "終端行と同じ本文も 1 行のメッセージとして届く"
    );
    assert!(b.transcript.shown.iter().any(|l| l.ends_with("got it")));
}

// ==============================================================
// ワイヤレベル
// ==============================================================

/// 生のソケットで相手役を務め、開始側の挨拶をワイヤ上で確認する
#[test]
fn test_greeting_on_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = thread::spawn(move || {
        let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end_matches('\n').to_string();
            if line == wire_line("(end)") {
                break;
            }
            lines.push(line);
        }

        writer
            .write_all(format!("{}\n{}\n", wire_line("/close"), wire_line("(end)")).as_bytes())
            .unwrap();
        writer.flush().unwrap();
        lines
    });

    let stream = accept_within(&listener, ACCEPT_TIMEOUT).unwrap();
    let initiator = run_side(client(dir.path()), stream, Role::Initiator, &[]);
    let lines = peer.join().unwrap();

    initiator.result.unwrap();
    assert_eq!(lines.len(), 1 + HELP_LINES.len());
    assert_eq!(lines[0], wire_line(WELCOME), "ワイヤ上は変換済み");
    assert_ne!(lines[0], WELCOME);
    assert_eq!(wire_line("(end)"), "2oxn3");
}

#[test]
fn test_peer_hangup_mid_message_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = thread::spawn(move || {
        let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;

        // 挨拶を最後まで読む
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim_end_matches('\n') == wire_line("(end)") {
                break;
            }
        }
        // 終端行を送らずに切断する
        writer
            .write_all(format!("{}\n", wire_line("partial")).as_bytes())
            .unwrap();
    });

    let stream = accept_within(&listener, ACCEPT_TIMEOUT).unwrap();
    let initiator = run_side(client(dir.path()), stream, Role::Initiator, &[]);
    peer.join().unwrap();

    assert!(matches!(
        initiator.result,
        Err(SessionError::Frame(FrameError::ProtocolDesync { lines_read: 1 }))
    ));
    assert_eq!(initiator.transcript.alerts.len(), 1, "オペレーターに知らせる");
    assert!(!initiator.transcript.shown.iter().any(|l| l == FAREWELL));
}

#[test]
fn test_accept_timeout_when_nobody_connects() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let err = accept_within(&listener, Duration::from_millis(100)).unwrap_err();
    assert_eq!(err.to_string(), "Time's over");
}
