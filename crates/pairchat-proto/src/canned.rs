//! 固定の定型メッセージ（ヘルプ一覧・ウェルカム・グリフ）

/// 接続直後に開始側が送るウェルカム行（終端なし、直後にヘルプ一覧が続く）
pub const WELCOME: &str = "Welcome! What would you like to do?";

/// コマンド一覧
pub const HELP_LINES: [&str; 8] = [
    "/help: show this list",
    "/close: close the connection",
    "/echo: send the last received message",
    "/smile: send a smile",
    "/like: send a thumb up",
    "/name NAME: change your current name to NAME (??? if invalid input)",
    "/status [AVAILABLE | BUSY]: change your current status",
    "/file FILEPATH: send the file located in FILEPATH",
];

/// `/smile` で送るグリフ
pub const SMILE_LINES: [&str; 4] = [
    " /000000\\ ",
    "|  ^  ^  |",
    "| \\____/ |",
    " \\______/ ",
];

/// `/like` で送るグリフ
pub const LIKE_LINES: [&str; 7] = [
    " ( ((           ",
    "  \\ =\\          ",
    " __\\_  `-\\      ",
    "(____))(  \\---- ",
    "(____)) _       ",
    "(____))         ",
    "(___))____/---- ",
];
