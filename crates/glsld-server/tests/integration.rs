//! End-to-end coverage of `run()` over the real `Content-Length` transport
//! (§6, §8): a scripted byte stream playing the client side, an in-memory
//! sink playing the client's stdin reader.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

fn frame(body: &serde_json::Value) -> Vec<u8> {
    let bytes = serde_json::to_vec(body).unwrap();
    let mut out = format!("Content-Length: {}\r\n\r\n", bytes.len()).into_bytes();
    out.extend_from_slice(&bytes);
    out
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn decode_frames(buf: &[u8]) -> Vec<serde_json::Value> {
    let mut reader = std::io::BufReader::new(buf);
    let mut out = Vec::new();
    while let Ok(body) = glsld_server_read_message(&mut reader) {
        out.push(serde_json::from_slice(&body).unwrap());
    }
    out
}

// `read_message` itself isn't public; re-implement the trivial framing read
// here rather than exposing internals just for a test.
fn glsld_server_read_message(reader: &mut impl std::io::BufRead) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("Content-Length") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }
    let len = content_length.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "no length"))?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(body)
}

#[test]
fn initialize_open_and_shutdown_over_real_transport() {
    let mut input = Vec::new();
    input.extend(frame(&serde_json::json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}
    })));
    input.extend(frame(&serde_json::json!({
        "jsonrpc": "2.0", "method": "textDocument/didOpen",
        "params": { "textDocument": { "uri": "file:///a.frag", "version": 1, "text": "void main() { float x = 1.0; }" } }
    })));
    input.extend(frame(&serde_json::json!({
        "jsonrpc": "2.0", "id": 2, "method": "shutdown", "params": {}
    })));
    input.extend(frame(&serde_json::json!({ "jsonrpc": "2.0", "method": "exit", "params": {} })));

    let output = SharedBuf::default();
    glsld_server::run(Cursor::new(input), output.clone(), glsld_server::Config::default());

    // The writer thread inside `run` joins before `run` returns, so the
    // buffer is fully populated here.
    let collected = output.0.lock().unwrap().clone();
    let frames = decode_frames(&collected);

    let has_init_response = frames.iter().any(|f| f.get("id") == Some(&serde_json::json!(1)) && f.get("result").is_some());
    assert!(has_init_response, "expected a successful initialize response, got {frames:?}");

    let has_diagnostics = frames.iter().any(|f| f.get("method") == Some(&serde_json::json!("textDocument/publishDiagnostics")));
    assert!(has_diagnostics, "expected a publishDiagnostics notification, got {frames:?}");

    let has_shutdown_response = frames.iter().any(|f| f.get("id") == Some(&serde_json::json!(2)));
    assert!(has_shutdown_response, "expected a shutdown response, got {frames:?}");
}
