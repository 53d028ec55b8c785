//! Process-level tests of the demo binary.
//!
//! These check the contract a shell sees: exit codes and which stream
//! carries what.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn demo() -> Command {
    let mut cmd = Command::cargo_bin("trellis-demo").unwrap();
    cmd.env_remove("TRELLIS_DEMO_CONFIG").env_remove("TRELLIS_LOG");
    cmd
}

#[test]
fn hello_uses_default_name() {
    demo()
        .arg("hello")
        .assert()
        .success()
        .stdout("Hello Alice!\n")
        .stderr("");
}

#[test]
fn hello_with_options() {
    demo()
        .args(["hello", "--loud", "-n", "Karen"])
        .assert()
        .success()
        .stdout("HELLO KAREN!\n");
}

#[test]
fn forwarded_command_uses_target_parameters() {
    demo()
        .args(["greet", "--name", "Karen"])
        .assert()
        .success()
        .stdout("Hello Karen!\n");
}

#[test]
fn leaf_filter_wraps_body() {
    demo()
        .arg("konnichiwa")
        .assert()
        .success()
        .stdout("[konnichiwa\nKonnichiwa!\nkonnichiwa]\n");
}

#[test]
fn exit_code_is_passed_through() {
    demo()
        .arg("exit-code")
        .assert()
        .code(128)
        .stdout("ExitCode=128\n");
}

#[test]
fn version_exits_zero() {
    demo()
        .arg("--version")
        .assert()
        .code(0)
        .stdout(format!("trellis-demo {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_works_after_a_command() {
    let expected = format!("trellis-demo {}\n", env!("CARGO_PKG_VERSION"));
    demo()
        .args(["hello", "--version"])
        .assert()
        .code(0)
        .stdout(expected.clone());
    demo()
        .args(["nested", "--version"])
        .assert()
        .code(0)
        .stdout(expected);
}

#[test]
fn index_exits_129() {
    demo()
        .assert()
        .code(129)
        .stdout(predicate::str::starts_with("Usage: trellis-demo [command]\n"))
        .stdout(predicate::str::contains("Demonstrates the trellis command engine."));

    demo()
        .arg("my-help")
        .assert()
        .code(129)
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn command_help_goes_to_stdout() {
    demo()
        .args(["nested", "hello", "--help"])
        .assert()
        .code(129)
        .stdout(predicate::str::starts_with(
            "Usage: trellis-demo nested hello [--help] arg0\n",
        ))
        .stderr("");
}

#[test]
fn unknown_command_suggests_on_stderr() {
    demo()
        .arg("axit-code")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Similar commands:"))
        .stderr(predicate::str::contains("exit-code"));
}

#[test]
fn fault_is_reported() {
    demo()
        .arg("fail")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with(
            "Unhandled Exception: could not save greeting\n",
        ))
        .stderr(predicate::str::contains("   at trellis-demo fail"));
}

#[test]
fn service_parameter_is_injected() {
    demo()
        .arg("store")
        .assert()
        .success()
        .stdout("Using greetings.db\n");
}

#[test]
fn stop_parsing_option_passes_rest_through() {
    demo()
        .args(["exec", "--run", "ls", "-la", "--", "x"])
        .assert()
        .success()
        .stdout("ls -la -- x\n");
}

#[test]
fn zsh_completion_script() {
    demo()
        .args(["--completion", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#compdef trellis-demo\n"));
}

#[test]
fn completion_candidates_from_provider() {
    demo()
        .args(["--completion-candidates", "bash:name", "--", "hello", "K"])
        .assert()
        .success()
        .stdout("Karen\nAlice\n");
}

#[test]
fn zsh_candidates_for_enum_argument() {
    demo()
        .args(["--completion-candidates", "zsh:@", "--", "mood", "S"])
        .assert()
        .success()
        .stdout("Sleepy\n");
}

#[test]
fn options_file_is_honored() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "enable_help_short_alias = false").unwrap();

    demo()
        .env("TRELLIS_DEMO_CONFIG", file.path())
        .args(["konnichiwa", "-h"])
        .assert()
        .code(1)
        .stderr("Error: Unknown option '-h'.\n");
}

#[test]
fn invalid_options_file_fails_startup() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_suggestions = 0").unwrap();

    demo()
        .env("TRELLIS_DEMO_CONFIG", file.path())
        .arg("hello")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: loading options from"));
}
