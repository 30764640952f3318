//! Minimal HTTP/1.1 server for end-to-end fetch tests.
//!
//! Routes:
//! - `/media/<name>` responds 200 with the configured body
//! - `/moved/<name>` responds 302 pointing at `/media/<name>`
//! - `/slow/<name>` sleeps for the configured delay, then responds like `/media`
//! - anything else responds 404

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct MediaServer {
    pub base_url: String,
    /// Every request line plus its User-Agent header, in arrival order
    pub requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MediaServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(body: Vec<u8>, slow_delay: Duration) -> MediaServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &body, slow_delay, &seen));
        }
    });
    MediaServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    slow_delay: Duration,
    seen: &Mutex<Vec<(String, Option<String>)>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or("").to_string();
    let user_agent = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, value)| value.trim().to_string());
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    seen.lock().unwrap().push((request_line, user_agent));

    if let Some(name) = path.strip_prefix("/moved/") {
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: /media/{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            name
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let serve = if path.starts_with("/slow/") {
        thread::sleep(slow_delay);
        true
    } else {
        path.starts_with("/media/")
    };

    if serve {
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(header.as_bytes());
        let _ = stream.write_all(body);
    } else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
    }
}
