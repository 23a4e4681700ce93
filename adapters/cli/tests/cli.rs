use std::process::{Command, Output};

use knapsack_arena_core::{ItemId, Puzzle};

fn arena(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_knapsack-arena"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch the knapsack-arena binary")
}

const TEXTBOOK: [&str; 9] = [
    "puzzle",
    "--capacity",
    "5",
    "--item",
    "2:3",
    "--item",
    "3:4",
    "--item",
    "4:5",
];

#[test]
fn puzzle_prints_the_solved_instance_as_json() {
    let output = arena(&[&TEXTBOOK[..], &["--seed", "3"][..]].concat());
    assert!(output.status.success(), "puzzle subcommand should succeed");

    let puzzle: Puzzle = serde_json::from_slice(&output.stdout).expect("stdout holds a puzzle");
    assert_eq!(puzzle.dp_table.final_value(), 7);
    assert_eq!(
        puzzle
            .optimal_selection
            .iter()
            .map(|item| item.id.clone())
            .collect::<Vec<_>>(),
        vec![ItemId::new("item0"), ItemId::new("item1")]
    );
    assert_eq!(
        puzzle.blank_cells.len(),
        4,
        "the default blank count is clamped to the eligible cells"
    );
}

#[test]
fn seeded_puzzles_are_reproducible() {
    let args = [&TEXTBOOK[..], &["--blanks", "2", "--seed", "11"][..]].concat();

    let first = arena(&args);
    let second = arena(&args);

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn malformed_items_are_rejected_before_solving() {
    let output = arena(&["puzzle", "--capacity", "5", "--item", "2-3"]);
    assert!(!output.status.success(), "a malformed item must fail");
    assert!(String::from_utf8_lossy(&output.stderr).contains("WEIGHT:VALUE"));

    let output = arena(&["puzzle", "--capacity", "5", "--item", "0:3"]);
    assert!(!output.status.success(), "a weightless item must fail");
}

#[test]
fn rehearsal_reports_the_promoted_guest() {
    let output = arena(&["rehearse", "--seed", "5"]);
    assert!(output.status.success(), "rehearse subcommand should succeed");

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds a report");
    assert_eq!(report["host_after_departure"], "grace");
    assert_eq!(report["optimal_value"], 7);
}

#[test]
fn missing_config_files_are_reported() {
    let output = arena(&["rehearse", "--config", "does-not-exist.toml"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read config"));
}
