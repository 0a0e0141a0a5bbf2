//! Minimal HTTP stub standing in for an upstream provider.
#![allow(dead_code)]
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use quote_common::Provider;

/// Serve every connection with the same canned response, forever.
pub fn spawn_stub(status: u16, body: &'static str) -> String {
    spawn_stub_with_delay(status, body, Duration::ZERO)
}

/// Like `spawn_stub`, but wait `delay` before answering each request.
pub fn spawn_stub_with_delay(status: u16, body: &'static str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/random", listener.local_addr().unwrap());
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            thread::spawn(move || answer(stream, status, body, delay));
        }
    });
    url
}

/// URL on which nothing listens.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/random", listener.local_addr().unwrap());
    drop(listener);
    url
}

/// Provider pointing at `url` with a short timeout.
pub fn provider(name: &str, url: &str) -> Provider {
    Provider::new(name, url).with_timeout(Duration::from_millis(500))
}

fn answer(mut stream: TcpStream, status: u16, body: &str, delay: Duration) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    thread::sleep(delay);
    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}
