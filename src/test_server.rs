//! Minimal HTTP/1.1 server for download tests.
//!
//! Answers every request with the same status and body, then closes the connection.
//! The announced `Content-Length` can exceed the body to simulate a dropped transfer.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Serve `body` with `status` on an ephemeral port. Returns the base URL
/// (e.g. `http://127.0.0.1:12345`). The server lives until the test process exits.
pub fn start(status: u16, body: Vec<u8>) -> String {
    let advertised = body.len();
    serve(status, body, advertised)
}

/// Announce `advertised` bytes, send only `body`, then hang up.
pub fn start_truncated(body: Vec<u8>, advertised: usize) -> String {
    assert!(advertised > body.len(), "advertised length must exceed the body");
    serve(200, body, advertised)
}

fn serve(status: u16, body: Vec<u8>, advertised: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, status, &body, advertised));
        }
    });
    format!("http://127.0.0.1:{port}")
}

/// A base URL nothing listens on.
pub fn unreachable() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn handle(mut stream: TcpStream, status: u16, body: &[u8], advertised: usize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let mut request = Vec::new();
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    if request.is_empty() {
        return;
    }
    let head = format!(
        "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        reason(status),
        advertised
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
