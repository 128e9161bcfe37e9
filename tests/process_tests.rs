//! Tests that run the compiled binary.
//!
//! These cover what only the process shows: the port announcement on stdout
//! and the exit status on bind failure.
//!
//! Run with: cargo test --test process_tests

use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const BINARY: &str = env!("CARGO_BIN_EXE_hello-eks");

/// Kills the child process when dropped so a failed assertion never leaks it.
struct ServerProcess(Child);

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Find a port that is currently free on all interfaces.
fn free_port() -> u16 {
    let listener = TcpListener::bind("0.0.0.0:0").expect("Failed to bind probe listener");
    listener.local_addr().unwrap().port()
}

fn command() -> Command {
    let mut cmd = Command::new(BINARY);
    cmd.env_remove("PORT")
        .env("RUST_LOG", "hello_eks=info")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Wait until the server prints a line containing `needle` on stdout.
fn wait_for_line(process: &mut ServerProcess, needle: String) -> String {
    let stdout = process.0.stdout.take().expect("stdout not captured");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if line.contains(&needle) {
                let _ = tx.send(line);
                return;
            }
        }
    });

    rx.recv_timeout(Duration::from_secs(10))
        .expect("Server did not announce its port within 10 seconds")
}

#[test]
fn announces_port_from_env() {
    let port = free_port();
    let mut process = ServerProcess(
        command()
            .env("PORT", port.to_string())
            .spawn()
            .expect("Failed to start server"),
    );

    let line = wait_for_line(&mut process, format!("Listening on {}", port));
    assert!(line.contains(&port.to_string()));
}

#[test]
fn announcement_survives_quiet_filter() {
    for filter in ["warn", "error", "off"] {
        let port = free_port();
        let mut process = ServerProcess(
            command()
                .env("RUST_LOG", filter)
                .env("PORT", port.to_string())
                .spawn()
                .expect("Failed to start server"),
        );

        wait_for_line(&mut process, format!("Listening on {}", port));
    }
}

#[test]
fn announcement_has_no_escape_codes_when_piped() {
    let port = free_port();
    let mut process = ServerProcess(
        command()
            .env("PORT", port.to_string())
            .spawn()
            .expect("Failed to start server"),
    );

    let line = wait_for_line(&mut process, format!("Listening on {}", port));
    assert!(!line.contains('\u{1b}'), "line: {:?}", line);
}

#[test]
fn binds_3000_without_port_env() {
    if TcpListener::bind("0.0.0.0:3000").is_err() {
        eprintln!("[test] port 3000 busy, skipping");
        return;
    }

    let mut process = ServerProcess(command().spawn().expect("Failed to start server"));

    wait_for_line(&mut process, "Listening on 3000".to_string());
}

#[test]
fn unparseable_port_env_falls_back_to_configured_port() {
    let port = free_port();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.toml");
    std::fs::write(&path, format!("[http]\nport = {}\n", port)).unwrap();

    let mut process = ServerProcess(
        command()
            .env("PORT", "abc")
            .arg("--config")
            .arg(&path)
            .spawn()
            .expect("Failed to start server"),
    );

    wait_for_line(&mut process, format!("Listening on {}", port));
}

#[test]
fn cli_port_overrides_env() {
    let port = free_port();
    let mut process = ServerProcess(
        command()
            .env("PORT", "1")
            .args(["--port", &port.to_string()])
            .spawn()
            .expect("Failed to start server"),
    );

    wait_for_line(&mut process, format!("Listening on {}", port));
}

#[test]
fn bind_failure_exits_non_zero() {
    let taken = TcpListener::bind("0.0.0.0:0").expect("Failed to bind blocker");
    let port = taken.local_addr().unwrap().port();

    let output = command()
        .env("PORT", port.to_string())
        .output()
        .expect("Failed to run server");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(&format!("Failed to bind 0.0.0.0:{}", port)),
        "stderr: {}",
        stderr
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Failed to bind"), "stdout: {}", stdout);

    drop(taken);
}

#[test]
fn invalid_config_file_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[http]\nport = \"not a number\"\n").unwrap();

    let output = command()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to run server");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse"), "stderr: {}", stderr);
}
