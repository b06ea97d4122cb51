// CLI behavior through the built binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

#[test]
fn cli_evaluates_expressions() {
    let mut cmd = Command::cargo_bin("lexparse").unwrap();
    cmd.arg("calc").arg("2 + 7 * 8");
    cmd.assert().success().stdout(contains("58"));
}

#[test]
fn cli_reports_parse_failures() {
    let mut cmd = Command::cargo_bin("lexparse").unwrap();
    cmd.arg("calc").arg("(2 + -x) * 8");
    cmd.assert()
        .failure()
        .stderr(contains("lexparse::parse").or(contains("help:")));
}

#[test]
fn cli_dumps_tokens() {
    let file = "tests/tokens_sample.txt";
    fs::write(file, "hello, \"world\"\n0xAF").unwrap();

    let mut cmd = Command::cargo_bin("lexparse").unwrap();
    cmd.arg("tokens").arg(file);
    cmd.assert().success().stdout(
        contains("NAME(\"hello\")")
            .and(contains("STRING(\"world\")"))
            .and(contains("NUMBER(175)"))
            .and(contains("EOF")),
    );

    let _ = fs::remove_file(file);
}

#[test]
fn cli_reports_miette_diagnostics_on_lex_error() {
    let bad_file = "tests/bad_tokens.txt";
    fs::write(bad_file, "a = 1;\nb = $;").unwrap();

    let mut cmd = Command::cargo_bin("lexparse").unwrap();
    cmd.arg("tokens").arg(bad_file);
    cmd.assert()
        .failure()
        .stderr(contains("lexparse::lex").and(contains("$")));

    let _ = fs::remove_file(bad_file);
}
