//! `Content-Length` framing (§6 wire protocol): read/write over generic
//! `Read`/`Write` so real `stdio` and an in-memory buffer (tests) use the
//! same code path — the teacher's own `core-input` keeps its framing layer
//! generic over its transport for the same reason.

use std::io::{self, BufRead, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed Content-Length header: {0}")]
    MalformedHeader(String),
    #[error("stream closed")]
    Eof,
}

/// Reads one `Content-Length: N\r\n\r\n<N bytes>` frame. `Content-Type`, if
/// present, is read and discarded — the spec only ever sends UTF-8 JSON.
pub fn read_message(reader: &mut impl BufRead) -> Result<Vec<u8>, TransportError> {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Err(TransportError::Eof);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(TransportError::MalformedHeader(line.to_string()));
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("Content-Length") {
            content_length = Some(
                value
                    .parse()
                    .map_err(|_| TransportError::MalformedHeader(line.to_string()))?,
            );
        }
        // Content-Type and any other header: ignored.
    }

    let len = content_length.ok_or_else(|| TransportError::MalformedHeader("missing Content-Length".into()))?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(|_| TransportError::Eof)?;
    Ok(body)
}

/// Writes `body` framed with its own `Content-Length` header, flushing so
/// the client sees it immediately.
pub fn write_message(writer: &mut impl Write, body: &[u8]) -> Result<(), TransportError> {
    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_message(&mut buf, br#"{"hello":"world"}"#).unwrap();
        let mut reader = BufReader::new(buf.as_slice());
        let body = read_message(&mut reader).unwrap();
        assert_eq!(body, br#"{"hello":"world"}"#);
    }

    #[test]
    fn ignores_content_type_header() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"Content-Length: 2\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\n\r\n{}");
        let mut reader = BufReader::new(buf.as_slice());
        let body = read_message(&mut reader).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn missing_content_length_is_an_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"Content-Type: application/vscode-jsonrpc\r\n\r\n{}");
        let mut reader = BufReader::new(buf.as_slice());
        assert!(read_message(&mut reader).is_err());
    }

    #[test]
    fn eof_before_any_header_is_reported() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(matches!(read_message(&mut reader), Err(TransportError::Eof)));
    }
}
