//! Companion terminal client for relaychat.
//!
//! Multiplexes keyboard input and socket input over one terminal
//! session: incoming text clears the prompt line, is printed with the
//! local nickname highlighted, and the prompt is redrawn. Outgoing lines
//! are sent as typed; a local `/nick <name>` also updates the nickname
//! tracked for highlighting.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use relaychat::line;

const PROMPT: &str = "You: ";
/// Clear the current terminal line and return the cursor to column one.
const CLEAR_LINE: &str = "\x1b[2K\r";
const HIGHLIGHT: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

/// Wrap every occurrence of `nick` in bold yellow.
fn highlight_nick(text: &str, nick: &str) -> String {
    if nick.is_empty() {
        return text.to_string();
    }
    text.replace(nick, &format!("{HIGHLIGHT}{nick}{RESET}"))
}

fn prompt() {
    print!("{PROMPT}");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let (host, port) = match (args.next(), args.next().and_then(|p| p.parse::<u16>().ok())) {
        (Some(host), Some(port)) => (host, port),
        _ => {
            eprintln!("usage: relaychat-client <host> <port>");
            std::process::exit(1);
        }
    };

    let stream = match TcpStream::connect((host.as_str(), port)).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("ERROR connecting to {host}:{port}: {e}");
            std::process::exit(1);
        }
    };

    let (mut socket_rx, mut socket_tx) = stream.into_split();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut nick = String::new();
    let mut buf = [0u8; 512];

    prompt();

    loop {
        tokio::select! {
            read = socket_rx.read(&mut buf) => match read {
                // Server closed the connection.
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let text = line::frame(&buf[..n]);
                    print!("{CLEAR_LINE}");
                    println!("{}", highlight_nick(&text, &nick));
                    prompt();
                }
            },

            input = stdin.next_line() => match input {
                Ok(Some(input_line)) => {
                    if let Some(name) = input_line.strip_prefix("/nick ") {
                        let name = name.trim();
                        if !name.is_empty() {
                            nick = name.to_string();
                        }
                    }
                    print!("{CLEAR_LINE}");
                    if socket_tx
                        .write_all(format!("{input_line}\n").as_bytes())
                        .await
                        .is_err()
                    {
                        break;
                    }
                    prompt();
                }
                // Stdin EOF ends the session.
                Ok(None) | Err(_) => break,
            },
        }
    }
}
