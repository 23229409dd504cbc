#![allow(dead_code)]

pub mod temp_db {
    use serde_json::Value;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writes `db` as `db.json` inside a fresh temp dir.
    ///
    /// The directory is removed when the returned `TempDir` drops.
    pub fn create_db(db: &Value) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, serde_json::to_string_pretty(db).unwrap()).unwrap();
        (dir, path)
    }

    pub fn fixture() -> Value {
        serde_json::json!({
            "shift_daily": [
                {
                    "id": "s1",
                    "shift_code": "MORNING",
                    "day_type": "Working Day",
                    "flexible_shift": "Yes",
                    "status": "Active",
                    "created_at": "2024-03-01T08:00:00.000Z"
                },
                {
                    "id": "s2",
                    "shift_code": "NIGHT",
                    "day_type": "OFF",
                    "flexible_shift": "No",
                    "status": "Inactive",
                    "created_at": "2024-03-04T08:00:00.000Z"
                },
                {
                    "id": "s3",
                    "shift_code": "MORNING-B",
                    "day_type": "Working Day",
                    "flexible_shift": "No",
                    "status": "Active",
                    "created_at": "2024-03-02T08:00:00.000Z"
                },
                {
                    "id": "s4",
                    "shift_code": "EVENING",
                    "day_type": "Working Day",
                    "flexible_shift": "Yes",
                    "status": "Active",
                    "created_at": "2024-03-03T08:00:00.000Z"
                }
            ],
            "find_all_menu": [
                { "id": 1, "name": "Dashboard", "children": [] },
                { "id": 2, "name": "Shift", "children": [{ "id": 3, "name": "Daily" }] }
            ],
            "posts": [
                { "id": 1, "title": "first" },
                { "id": 2, "title": "second" }
            ],
            "profile": { "name": "ops" }
        })
    }
}

pub mod test_server {
    use shiftdesk::server::{AppService, HttpServer, ServerHandle};
    use shiftdesk::store::DataStore;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::path::Path;
    use std::sync::{Arc, Once};
    use std::time::Duration;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x10000);
        });
    }

    /// Running server bound to an ephemeral port, stopped on drop.
    pub struct TestServer {
        handle: Option<ServerHandle>,
        pub addr: SocketAddr,
        pub store: Arc<DataStore>,
    }

    impl TestServer {
        pub fn start(db_path: &Path) -> Self {
            setup_may_runtime();
            let store = Arc::new(DataStore::open(db_path));
            let service = AppService::with_defaults(Arc::clone(&store)).unwrap();
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();
            Self {
                handle: Some(handle),
                addr,
                store,
            }
        }

        pub fn send(&self, req: &str) -> String {
            send_request(&self.addr, req)
        }

        /// Sends a request with an optional JSON body and returns the parsed parts.
        pub fn request(&self, method: &str, path: &str, body: Option<&str>) -> Response {
            let req = match body {
                Some(body) => format!(
                    "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                ),
                None => format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
            };
            parse_parts(&self.send(&req))
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }

    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[derive(Debug)]
    pub struct Response {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl Response {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("invalid json body {:?}: {e}", self.body))
        }
    }

    pub fn parse_parts(resp: &str) -> Response {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut status = 0;
        let mut headers = Vec::new();
        for line in head.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            } else if let Some((name, val)) = line.split_once(':') {
                headers.push((name.trim().to_string(), val.trim().to_string()));
            }
        }
        Response {
            status,
            headers,
            body: body.to_string(),
        }
    }
}
