//! End-to-end tests: a real listener, the reactor running on the test runtime, and clients
//! talking to it over TCP.

use ircserv::{config, net, Shutdown, State};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const PASSWORD: &str = "pw";
const TIMEOUT: Duration = Duration::from_secs(5);

struct Server {
    addr: SocketAddr,
    shutdown: Arc<Shutdown>,
    handle: JoinHandle<()>,
}

async fn server() -> Server {
    let listener = net::listen(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let state = State::new(config::State {
        domain: String::from("ircserv.test"),
        password: String::from(PASSWORD),
    });
    let shutdown = Arc::new(Shutdown::new());
    let handle = tokio::spawn(net::run(listener, state, shutdown.clone()));
    Server {
        addr,
        shutdown,
        handle,
    }
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(server: &Server) -> Self {
        let stream = TcpStream::connect(server.addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
        };
        client.wait_for("NOTICE *").await;
        client
    }

    /// Connects, then goes through PASS, NICK and USER.
    async fn register(server: &Server, nick: &str) -> Self {
        let mut client = Self::connect(server).await;
        client
            .send_raw(&format!(
                "PASS {}\r\nNICK {}\r\nUSER {} 0 * :{}\r\n",
                PASSWORD, nick, nick, nick
            ))
            .await;
        client.wait_for(&format!(" 004 {} ", nick)).await;
        client
    }

    async fn send_raw(&mut self, bytes: &str) {
        self.writer.write_all(bytes.as_bytes()).await.unwrap();
    }

    async fn send(&mut self, line: &str) {
        self.send_raw(&format!("{}\r\n", line)).await;
    }

    /// Reads one line, or `None` at the end of the stream.
    async fn recv(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = timeout(TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a message")
            .unwrap();
        if n == 0 {
            None
        } else {
            Some(line)
        }
    }

    /// Skips lines until one contains `needle`, and returns it.
    async fn wait_for(&mut self, needle: &str) -> String {
        loop {
            match self.recv().await {
                Some(line) if line.contains(needle) => return line,
                Some(_) => {}
                None => panic!("connection closed while waiting for {:?}", needle),
            }
        }
    }

    /// Reads until the server closes the connection.
    async fn wait_closed(&mut self) {
        while self.recv().await.is_some() {}
    }
}

#[tokio::test]
async fn test_registration_split_across_writes() {
    let server = server().await;
    let mut alice = TestClient::connect(&server).await;

    alice.send_raw("PASS pw\r\nNI").await;
    alice.send_raw("CK alice\r\nUSER alice 0 * :Al").await;
    alice.send_raw("ice\r").await;
    alice.send_raw("\n").await;

    let welcome = alice.wait_for(" 001 alice ").await;
    assert!(welcome.starts_with(":ircserv.test 001 alice :"), "{:?}", welcome);
    alice.wait_for(" 002 alice ").await;
    alice.wait_for(" 003 alice ").await;
    alice.wait_for(" 004 alice ").await;
}

#[tokio::test]
async fn test_wrong_password() {
    let server = server().await;
    let mut alice = TestClient::connect(&server).await;

    alice.send("PASS nope").await;
    alice.wait_for(" 464 ").await;
    alice.send("NICK alice").await;
    alice.send("USER alice 0 * :Alice").await;
    alice.send("PING token").await;
    // Registration never completed, so PING is refused like any other command.
    let reply = alice.wait_for(" 451 ").await;
    assert!(!reply.contains(" 001 "));
}

#[tokio::test]
async fn test_kick() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    alice.send("JOIN #town").await;
    alice.wait_for(" 331 alice #town ").await;
    bob.send("JOIN #town").await;
    bob.wait_for(" 331 bob #town ").await;
    alice.wait_for("bob!bob@127.0.0.1 JOIN #town").await;

    alice.send("KICK #town bob :bye").await;
    let kick = bob.wait_for(" KICK #town bob ").await;
    assert!(kick.starts_with(":alice!alice@127.0.0.1 "), "{:?}", kick);
    assert!(kick.trim_end().ends_with("bye"), "{:?}", kick);
    alice.wait_for(" KICK #town bob ").await;

    bob.send("PART #town").await;
    bob.wait_for(" 442 bob #town ").await;
}

#[tokio::test]
async fn test_channel_full() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    alice.send("JOIN #town").await;
    alice.send("MODE #town +l 1").await;
    alice.wait_for(" MODE #town +l 1").await;

    bob.send("JOIN #town").await;
    bob.wait_for(" 471 bob #town ").await;
}

#[tokio::test]
async fn test_privmsg_between_clients() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    alice.send("PRIVMSG bob :hello there").await;
    let msg = bob.wait_for(" PRIVMSG bob ").await;
    assert_eq!(msg, ":alice!alice@127.0.0.1 PRIVMSG bob :hello there\r\n");
}

#[tokio::test]
async fn test_backlog_delivered_intact() {
    const COUNT: usize = 10_000;

    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    // Far more than the socket buffers hold while bob is not reading: the server has to keep
    // the rest of each write for later.
    let padding = "x".repeat(400);
    let mut burst = String::new();
    for i in 0..COUNT {
        burst.push_str(&format!("PRIVMSG bob :{} {}\r\n", i, padding));
    }
    alice.send_raw(&burst).await;

    for i in 0..COUNT {
        let line = bob.recv().await.expect("connection closed");
        assert_eq!(
            line,
            format!(":alice!alice@127.0.0.1 PRIVMSG bob :{} {}\r\n", i, padding)
        );
    }
}

#[tokio::test]
async fn test_quit_closes_connection() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    alice.send("JOIN #town").await;
    alice.wait_for(" 331 alice #town ").await;
    bob.send("JOIN #town").await;
    alice.wait_for("bob!bob@127.0.0.1 JOIN #town").await;

    bob.send("QUIT :gone fishing").await;
    bob.wait_closed().await;
    let quit = alice.wait_for(" QUIT ").await;
    assert!(quit.starts_with(":bob!bob@127.0.0.1 QUIT"), "{:?}", quit);
    assert!(quit.contains("gone fishing"), "{:?}", quit);

    // The nickname is free again.
    let mut bob = TestClient::register(&server, "bob").await;
    bob.send("PING again").await;
    bob.wait_for("PONG").await;
}

#[tokio::test]
async fn test_peer_disconnect() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::register(&server, "bob").await;

    alice.send("JOIN #town").await;
    alice.wait_for(" 331 alice #town ").await;
    bob.send("JOIN #town").await;
    alice.wait_for("bob!bob@127.0.0.1 JOIN #town").await;
    // Unread data would make the close a reset instead.
    bob.send("PING sync").await;
    bob.wait_for("PONG").await;

    drop(bob);
    let quit = alice.wait_for(" QUIT ").await;
    assert!(quit.contains("Connection closed"), "{:?}", quit);
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let server = server().await;
    let mut alice = TestClient::register(&server, "alice").await;
    let mut bob = TestClient::connect(&server).await;

    server.shutdown.request();
    alice.wait_closed().await;
    bob.wait_closed().await;
    timeout(TIMEOUT, server.handle)
        .await
        .expect("the reactor did not stop")
        .unwrap();
}
