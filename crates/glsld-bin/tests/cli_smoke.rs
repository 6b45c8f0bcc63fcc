//! Smoke test for the compiled `glsld` binary (§1 AMBIENT test-tooling note,
//! mirroring `ox-bin/tests/`): spawn the real executable, drive it over its
//! actual `stdin`/`stdout` pipes with a scripted JSON-RPC session, and check
//! that an `initialize` response comes back before the process is asked to
//! exit.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

fn frame(body: &serde_json::Value) -> Vec<u8> {
    let bytes = serde_json::to_vec(body).unwrap();
    let mut out = format!("Content-Length: {}\r\n\r\n", bytes.len()).into_bytes();
    out.extend_from_slice(&bytes);
    out
}

#[test]
fn initialize_and_exit_round_trip() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_glsld"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch glsld binary");

    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = child.stdout.take().unwrap();

    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });

    stdin
        .write_all(&frame(&serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}
        })))
        .unwrap();
    stdin
        .write_all(&frame(&serde_json::json!({
            "jsonrpc": "2.0", "method": "exit", "params": {}
        })))
        .unwrap();
    drop(stdin);

    let status = child
        .wait_timeout_or_kill(Duration::from_secs(5))
        .expect("glsld binary did not exit in time");
    assert!(status.success(), "glsld exited with {status:?}");

    let output = reader.join().expect("reader thread panicked");
    assert!(
        output.windows(b"\"id\":1".len()).any(|w| w == b"\"id\":1"),
        "expected an initialize response echoing id 1, got {:?}",
        String::from_utf8_lossy(&output)
    );
}

/// `std::process::Child` has no built-in timeout, so poll `try_wait` instead
/// of risking a test hang if the binary never exits.
trait WaitTimeoutOrKill {
    fn wait_timeout_or_kill(&mut self, timeout: Duration) -> std::io::Result<std::process::ExitStatus>;
}

impl WaitTimeoutOrKill for std::process::Child {
    fn wait_timeout_or_kill(&mut self, timeout: Duration) -> std::io::Result<std::process::ExitStatus> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(status);
            }
            if std::time::Instant::now() >= deadline {
                let _ = self.kill();
                let _ = self.wait();
                return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "process did not exit in time"));
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}
