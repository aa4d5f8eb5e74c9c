// Blocking connection to the relay with a dedicated reader thread. The
// thread decodes line-framed JSON into an inbox channel; the simulation
// loop drains the inbox between ticks and never waits on the socket.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use protocol::{decode_line, encode_line, Message};
use tracing::{debug, warn};

pub struct NetClient {
    stream: TcpStream,
    inbox: Receiver<Message>,
    connected: Arc<AtomicBool>,
}

impl NetClient {
    /// Connects with a timeout and starts the reader thread. The thread
    /// exits on its own when the socket closes.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<Self> {
        let addr = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no address")
        })?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        // Gameplay messages are tiny and latency-sensitive.
        stream.set_nodelay(true)?;

        let connected = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel();
        let reader = stream.try_clone()?;
        let flag = Arc::clone(&connected);
        std::thread::spawn(move || read_loop(reader, tx, flag));

        Ok(Self {
            stream,
            inbox: rx,
            connected,
        })
    }

    /// False once either direction of the connection has failed. The
    /// session keeps simulating locally; it just stops hearing peers.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Everything received since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<Message> {
        self.inbox.try_iter().collect()
    }

    /// Best-effort send; a write failure marks the connection dead rather
    /// than propagating, matching the non-authoritative relay model.
    pub fn send(&mut self, msg: &Message) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.stream.write_all(encode_line(msg).as_bytes()) {
            warn!(error = %e, "send failed, dropping connection");
            self.connected.store(false, Ordering::Relaxed);
        }
    }

    pub fn join(&mut self, room: &str, name: &str, ch: &str) {
        self.send(&Message::Join {
            room: room.to_string(),
            name: name.to_string(),
            ch: ch.to_string(),
        });
    }

    pub fn ready(&mut self, ready: bool) {
        self.send(&Message::Ready { ready });
    }

    pub fn leave(&mut self) {
        self.send(&Message::Leave);
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::Relaxed);
        // Unblocks the reader thread's pending read.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn read_loop(stream: TcpStream, tx: Sender<Message>, connected: Arc<AtomicBool>) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => match decode_line(&line) {
                Ok(msg) => {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                // Bad records are dropped; the stream itself is fine.
                Err(e) => debug!(error = %e, "dropping malformed record"),
            },
            Err(e) => {
                debug!(error = %e, "read failed");
                break;
            }
        }
    }
    connected.store(false, Ordering::Relaxed);
    debug!("reader thread exited");
}
