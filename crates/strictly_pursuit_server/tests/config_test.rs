//! Tests for loading server configuration and board files.

use std::io::Write;

use strictly_pursuit::StationId;
use strictly_pursuit_server::ServerConfig;
use tempfile::NamedTempFile;

const TRIANGLE_BOARD: &str = r#"
[[stations]]
number = 1
x = 0
y = 0

[[stations]]
number = 2
x = 1
y = 0

[[stations]]
number = 3
x = 0
y = 1

[[connections]]
station1 = 1
station2 = 2
transit = "Taxi"

[[connections]]
station1 = 2
station2 = 3
transit = "Bus"

[[connections]]
station1 = 3
station2 = 1
transit = "Ferry"

[starting_positions]
evader = [1]
pursuers = [2, 3]
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_temp(
        r#"
host = "0.0.0.0"
port = 8080
match_size = 2
max_evader_turns = 10
reveal_turns = [2, 4]
seed = 17
"#,
    );
    let config = ServerConfig::from_file(file.path()).expect("load");
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8080);
    assert_eq!(*config.match_size(), 2);
    assert_eq!(*config.max_evader_turns(), 10);
    assert_eq!(config.reveal_turns(), &vec![2, 4]);
    assert_eq!(*config.seed(), Some(17));
}

#[test]
fn test_missing_file_is_error() {
    let err = ServerConfig::from_file("/nonexistent/pursuit.toml").unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_malformed_config_is_error() {
    let file = write_temp("port = \"not a number\"");
    let err = ServerConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_default_board_is_builtin() {
    let board = ServerConfig::default().load_board().expect("board");
    assert_eq!(board.stations().len(), 7);
    assert_eq!(board.connections().len(), 12);
}

#[test]
fn test_custom_board_file() {
    let board_file = write_temp(TRIANGLE_BOARD);
    let config_file = write_temp(&format!(
        "match_size = 2\nboard = {:?}\n",
        board_file.path().display().to_string()
    ));

    let config = ServerConfig::from_file(config_file.path()).expect("config");
    let board = config.load_board().expect("board");
    assert_eq!(board.stations().len(), 3);
    assert!(board.neighbors_of(StationId(1)).contains(&StationId(3)));
    assert!(config.validate(&board).is_ok());
}

#[test]
fn test_board_too_small_for_match_size() {
    let board_file = write_temp(TRIANGLE_BOARD);
    let config_file = write_temp(&format!(
        "match_size = 4\nboard = {:?}\n",
        board_file.path().display().to_string()
    ));

    let config = ServerConfig::from_file(config_file.path()).expect("config");
    let board = config.load_board().expect("board");
    let err = config.validate(&board).unwrap_err();
    assert!(err.message.contains("Pursuer pool"));
}

#[test]
fn test_invalid_board_is_error() {
    let board_file = write_temp(
        r#"
[[stations]]
number = 1
x = 0
y = 0

[[connections]]
station1 = 1
station2 = 9
transit = "Taxi"

[starting_positions]
evader = [1]
pursuers = [1]
"#,
    );
    let config = ServerConfig::default().with_board(Some(board_file.path().to_path_buf()));
    let err = config.load_board().unwrap_err();
    assert!(err.message.contains("Invalid board"));
}

#[test]
fn test_shipped_files_match_builtin() {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../..");
    let config = ServerConfig::from_file(format!("{}/pursuit.toml", root)).expect("config");
    assert_eq!(*config.match_size(), 3);
    assert_eq!(config.reveal_turns(), &vec![1, 3]);

    let config = config.with_board(Some(format!("{}/boards/classic.toml", root).into()));
    let board = config.load_board().expect("board");
    assert_eq!(board, strictly_pursuit::Board::classic());
}
