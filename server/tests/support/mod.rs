// One-time server bootstrap shared by the integration tests, plus a small
// blocking line-framed test client.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use protocol::{decode_line, encode_line, Message};

static SERVER_ADDR: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

/// Ensures the relay server is running and returns its address.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // An OS thread so the server outlives individual test runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                server::run(listener).await.expect("server failed");
            });
        });

        let addr = loop {
            if let Some(addr) = published.get() {
                break addr.clone();
            }
            std::thread::sleep(Duration::from_millis(10));
        };
        let _ = SERVER_ADDR.set(addr.clone());

        // Wait until the socket accepts connections.
        for _ in 0..100 {
            if TcpStream::connect(&addr).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("server never became ready at {addr}");
    });

    SERVER_ADDR.get().expect("server addr published").as_str()
}

pub struct TestClient {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TestClient {
    pub fn connect() -> Self {
        let addr = ensure_server();
        let stream = TcpStream::connect(addr).expect("connect to test server");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("set read timeout");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        Self { stream, reader }
    }

    pub fn send(&mut self, msg: &Message) {
        self.stream
            .write_all(encode_line(msg).as_bytes())
            .expect("send message");
    }

    /// Writes raw bytes, for exercising the malformed-record path.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("send raw bytes");
    }

    pub fn join(&mut self, room: &str, name: &str) -> String {
        self.send(&Message::Join {
            room: room.to_string(),
            name: name.to_string(),
            ch: "🙂".to_string(),
        });
        match self.recv_until(|m| matches!(m, Message::Welcome { .. })) {
            Message::Welcome { id, .. } => id,
            _ => unreachable!(),
        }
    }

    pub fn recv(&mut self) -> Message {
        loop {
            let mut line = String::new();
            self.reader.read_line(&mut line).expect("read line");
            if line.trim().is_empty() {
                continue;
            }
            return decode_line(&line).expect("decode message");
        }
    }

    /// Reads until a message matches, panicking after a generous budget so
    /// a missing broadcast fails the test instead of hanging it.
    pub fn recv_until(&mut self, pred: impl Fn(&Message) -> bool) -> Message {
        for _ in 0..100 {
            let msg = self.recv();
            if pred(&msg) {
                return msg;
            }
        }
        panic!("expected message never arrived");
    }

    /// True if nothing arrives within `window`.
    pub fn silent_for(&mut self, window: Duration) -> bool {
        self.stream
            .set_read_timeout(Some(window))
            .expect("set read timeout");
        let mut line = String::new();
        let silent = match self.reader.read_line(&mut line) {
            Err(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
            Ok(0) => false,
            Ok(_) => false,
        };
        self.stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("restore read timeout");
        silent
    }
}
