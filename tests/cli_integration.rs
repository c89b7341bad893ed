// Integration tests for the congress binary.
// Each test gets its own config and database in a temp directory and drives
// the CLI the way an operator would.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        let database = dir.path().join("congress.db");

        let ws = Self { _dir: dir, config };
        let output = ws.run(&["init", "--database", database.to_str().unwrap()]);
        assert!(output.status.success(), "init failed: {:?}", output);
        ws
    }

    fn run(&self, args: &[&str]) -> Output {
        run_with_config(&self.config, args)
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }
}

fn run_with_config(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_congress"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_congress"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["init", "propose", "vote", "resign", "show", "list", "seed"] {
        assert!(stdout.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_init_writes_config() {
    let ws = Workspace::new();
    let contents = std::fs::read_to_string(&ws.config).unwrap();
    assert!(contents.contains("proposal_cooldown = \"2days\""));
}

#[test]
fn test_full_proposal_round() {
    let ws = Workspace::new();
    ws.ok(&["seed", "member", "1", "--body", "1"]);
    ws.ok(&["seed", "member", "2", "--body", "1"]);
    ws.ok(&["seed", "treasury", "1", "100", "--currency", "gold"]);

    let submitted = ws.ok(&[
        "--as",
        "1",
        "propose",
        "transfer-funds",
        "--reason",
        "road repairs",
        "--member",
        "2",
        "--amount",
        "40.50",
        "--currency",
        "gold",
    ]);
    assert!(submitted.contains("proposal#1"));

    let first = ws.ok(&["--as", "1", "vote", "1", "--yes"]);
    assert!(first.contains("1 yes, 0 no of 2"));

    let last = ws.ok(&["--as", "2", "vote", "1", "--no"]);
    assert!(last.contains("applied"));

    let shown = ws.ok(&["show", "1", "--json"]);
    let document: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(document["proposal"]["status"], "applied");
    assert_eq!(document["votes"].as_array().unwrap().len(), 2);

    let listed = ws.ok(&["list", "--body", "1"]);
    assert!(listed.contains("transfer 40.50 gold to user#2"));
}

#[test]
fn test_simultaneous_vote_processes_both_count() {
    let ws = Workspace::new();
    for member in ["1", "2", "3"] {
        ws.ok(&["seed", "member", member, "--body", "1"]);
    }
    ws.ok(&[
        "--as",
        "1",
        "propose",
        "work-tax",
        "--reason",
        "schools",
        "--amount",
        "4",
    ]);

    let children: Vec<_> = ["1", "2", "3"]
        .iter()
        .map(|member| {
            Command::new(env!("CARGO_BIN_EXE_congress"))
                .arg("--config")
                .arg(&ws.config)
                .args(["--as", member, "vote", "1", "--yes"])
                .env("RUST_LOG", "warn")
                .spawn()
                .expect("Failed to spawn command")
        })
        .collect();
    for child in children {
        let output = child.wait_with_output().unwrap();
        assert!(output.status.success(), "vote failed: {:?}", output);
    }

    let shown = ws.ok(&["show", "1", "--json"]);
    let document: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(document["proposal"]["status"], "applied");
    assert_eq!(document["proposal"]["yes_votes"], 3);
    assert_eq!(document["votes"].as_array().unwrap().len(), 3);
}

#[test]
fn test_errors_exit_nonzero() {
    let ws = Workspace::new();
    ws.ok(&["seed", "member", "1", "--body", "1"]);

    // No acting user.
    let output = ws.run(&["propose", "work-tax", "--reason", "x", "--amount", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));

    // Unknown proposal.
    let output = ws.run(&["--as", "1", "vote", "99", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not found"));

    // Missing payload field.
    let output = ws.run(&["--as", "1", "propose", "impeachment", "--reason", "x"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_resign_twice_fails() {
    let ws = Workspace::new();
    ws.ok(&["seed", "member", "3", "--body", "1"]);

    ws.ok(&["--as", "3", "resign"]);
    let output = ws.run(&["--as", "3", "resign"]);
    assert!(!output.status.success());
}

#[test]
fn test_list_empty_body() {
    let ws = Workspace::new();
    let listed = ws.ok(&["list", "--body", "7"]);
    assert!(listed.contains("No proposals found."));
}
