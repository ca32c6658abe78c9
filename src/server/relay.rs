//! The relay event loop.
//!
//! One task owns all mutable state: the client registry, the outbound
//! write halves, and the log level control. Per-connection reader tasks
//! only read raw chunks and forward them as events; every piece of
//! interpretation and every outbound write happens here, sequentially.
//! Handler bodies therefore never interleave, and a broadcast is atomic
//! with respect to other inbound processing.
//!
//! Outbound writes are sequential `write_all` calls from this task, so a
//! stalled client can stall the whole relay. Known limitation, kept to
//! preserve the observable event ordering; see DESIGN.md.

use std::collections::HashMap;
use std::net::SocketAddr;

use rand::Rng;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::command::{self, Command};
use crate::config::ServerConfig;
use crate::line::{self, READ_BUFFER_SIZE};
use crate::logging::{LogControl, LogLevel};
use crate::registry::{ClientId, ClientRegistry};
use crate::server::ChatListener;
use crate::Result;

/// Join greetings; one is chosen uniformly at random per connection.
const GREETINGS: [&str; 6] = [
    "Welcome!",
    "Glad you made it!",
    "Ahoy!",
    "Howdy!",
    "Nice to see you!",
    "Hello there!",
];

/// Readiness events forwarded to the relay loop by reader tasks.
#[derive(Debug)]
enum Event {
    /// One raw chunk read from a client socket.
    Inbound(ClientId, Vec<u8>),
    /// The client's read half reached EOF or errored.
    Disconnected(ClientId),
}

/// The chat relay: client table, outbound writers, and dispatch logic.
pub struct Relay {
    registry: ClientRegistry,
    writers: HashMap<ClientId, OwnedWriteHalf>,
    log: LogControl,
    next_id: u64,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: Option<mpsc::UnboundedReceiver<Event>>,
}

impl Relay {
    /// Create a relay with the configured client capacity.
    pub fn new(config: &ServerConfig, log: LogControl) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            registry: ClientRegistry::new(config.max_clients),
            writers: HashMap::new(),
            log,
            next_id: 1,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Run the relay with the process's standard input as the console.
    ///
    /// Never returns under normal operation; the loop is purely reactive
    /// and has no termination path of its own.
    pub async fn run(self, listener: ChatListener) -> Result<()> {
        self.run_with_console(listener, tokio::io::stdin()).await
    }

    /// Run the relay with an explicit console stream.
    ///
    /// Anything read from the console is broadcast verbatim to all live
    /// clients, with no command interpretation. Console EOF leaves the
    /// server running with the console permanently quiescent. Tests pass
    /// `tokio::io::empty()` or a duplex stream here.
    pub async fn run_with_console<C>(mut self, listener: ChatListener, console: C) -> Result<()>
    where
        C: AsyncRead + Unpin,
    {
        // The receiver lives outside `self` for the duration of the loop
        // so branch futures and handlers never borrow-conflict.
        let Some(mut events_rx) = self.events_rx.take() else {
            return Ok(());
        };
        let mut console = BufReader::new(console).lines();
        let mut console_open = true;

        loop {
            tokio::select! {
                biased;

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => self.handle_accept(stream, addr).await,
                    // Accept errors are isolated to that connection attempt.
                    Err(e) => warn!("accept failed: {e}"),
                },

                read = console.next_line(), if console_open => match read {
                    Ok(Some(input)) => self.handle_console(&input).await,
                    Ok(None) | Err(_) => {
                        debug!("console input closed");
                        console_open = false;
                    }
                },

                event = events_rx.recv() => match event {
                    Some(Event::Inbound(id, chunk)) => self.handle_inbound(id, &chunk).await,
                    Some(Event::Disconnected(id)) => self.handle_disconnect(id).await,
                    // The loop holds a sender, so the channel never closes.
                    None => {}
                },
            }
        }
    }

    /// Register a new connection and broadcast its join notice.
    async fn handle_accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        let id = ClientId(self.next_id);
        self.next_id += 1;

        if self.registry.register(id).is_err() {
            // Capacity exhausted: drop the socket, no greeting, no notice.
            debug!("rejecting connection from {addr}: registry full");
            return;
        }

        let (read_half, write_half) = stream.into_split();
        self.writers.insert(id, write_half);
        self.spawn_reader(id, read_half);
        info!("Client {id} connected from {addr}");

        let greeting = GREETINGS[rand::rng().random_range(0..GREETINGS.len())];
        let notice = format!("Client {id} has joined the channel — {greeting}");
        self.broadcast_all(&notice).await;
    }

    /// Broadcast one console line verbatim to all live clients.
    async fn handle_console(&mut self, input: &str) {
        debug!("stdin: {input}");
        self.broadcast_all(input).await;
    }

    /// Frame one inbound chunk and dispatch the resulting command.
    async fn handle_inbound(&mut self, id: ClientId, chunk: &[u8]) {
        // A chunk can arrive after /quit already freed the slot.
        if !self.registry.contains(id) {
            return;
        }

        let framed = line::frame(chunk);
        match command::parse(&framed) {
            Command::Nick(name) => {
                self.registry.set_nickname(id, &name);
                let shown = if name.is_empty() {
                    "(empty)".to_string()
                } else {
                    self.registry.display_name(id)
                };
                self.send_to(id, &format!("*[System] Username set to {shown}*"))
                    .await;
            }
            Command::Help => self.send_to(id, command::help_text()).await,
            Command::Who => {
                self.send_to(id, "Users online:").await;
                let names: Vec<String> = self
                    .registry
                    .live()
                    .map(|e| {
                        if e.nickname.is_empty() {
                            format!("Client {}", e.id)
                        } else {
                            e.nickname.clone()
                        }
                    })
                    .collect();
                for name in names {
                    self.send_to(id, &format!(" - {name}")).await;
                }
            }
            Command::Me(text) => {
                let name = self.registry.display_name(id);
                self.broadcast_except(id, &format!("*{name} {text}*")).await;
            }
            Command::Ping => self.send_to(id, "PONG").await,
            Command::Debug(arg) => {
                // Unrecognized input silently resets to ERROR; the ack
                // names whatever level actually took effect.
                let level = LogLevel::parse_lenient(&arg);
                self.log.set_level(level);
                self.send_to(id, &format!("*[System] Log level set to {level}*"))
                    .await;
            }
            Command::Quit => {
                info!("Client {id} quit");
                self.close(id);
            }
            Command::Unknown(raw) => {
                self.send_to(id, &format!("*[System] Unknown command: {raw}*"))
                    .await;
            }
            Command::Chat(text) => {
                let name = self.registry.display_name(id);
                info!("{name}: {text}");
                self.broadcast_except(id, &format!("{name}: {text}")).await;
            }
        }
    }

    /// Close a disconnected client and tell everyone else.
    ///
    /// A client that left via `/quit` was unregistered there, so the
    /// trailing event from its reader task finds nothing and emits no
    /// second notice.
    async fn handle_disconnect(&mut self, id: ClientId) {
        if !self.registry.contains(id) {
            return;
        }

        let name = self.registry.display_name(id);
        self.close(id);
        info!("Client {id} disconnected");
        self.broadcast_all(&format!("*[System] {name} has left the channel*"))
            .await;
    }

    /// Spawn the reader task feeding this client's events into the loop.
    fn spawn_reader(&self, id: ClientId, mut read_half: OwnedReadHalf) {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) | Err(_) => {
                        let _ = events.send(Event::Disconnected(id));
                        break;
                    }
                    Ok(n) => {
                        if events.send(Event::Inbound(id, buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Free the client's slot and drop its write half, closing the socket.
    fn close(&mut self, id: ClientId) {
        self.registry.unregister(id);
        self.writers.remove(&id);
    }

    /// Send one wire-framed line to a single client.
    ///
    /// Write errors are isolated: the reader task surfaces the dead
    /// connection soon enough, and no other client is affected.
    async fn send_to(&mut self, id: ClientId, text: &str) {
        if let Some(writer) = self.writers.get_mut(&id) {
            if let Err(e) = writer.write_all(&line::wire(text)).await {
                debug!("write to Client {id} failed: {e}");
            }
        }
    }

    /// Send a line to every live client, in slot order.
    async fn broadcast_all(&mut self, text: &str) {
        let ids: Vec<ClientId> = self.registry.live().map(|e| e.id).collect();
        for id in ids {
            self.send_to(id, text).await;
        }
    }

    /// Send a line to every live client except the sender.
    async fn broadcast_except(&mut self, sender: ClientId, text: &str) {
        let ids: Vec<ClientId> = self
            .registry
            .live()
            .map(|e| e.id)
            .filter(|id| *id != sender)
            .collect();
        for id in ids {
            self.send_to(id, text).await;
        }
    }
}
