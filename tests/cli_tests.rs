// CLI surface smoke tests - argument parsing and guidance, no network

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_save_and_list_commands() {
    let mut cmd = Command::cargo_bin("cardstash").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("collection"));
}

#[test]
fn save_requires_a_name_source() {
    let mut cmd = Command::cargo_bin("cardstash").unwrap();

    cmd.args(["save", "--items", "does-not-matter.json", "--owner", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide --name or --generate-name"));
}

#[test]
fn missing_subcommand_prints_usage() {
    let mut cmd = Command::cargo_bin("cardstash").unwrap();

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
