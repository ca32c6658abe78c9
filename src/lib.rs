//! relaychat - a minimal line-oriented TCP chat relay.
//!
//! A server accepts TCP connections, reads line-oriented text from each
//! client, interprets a small set of slash-commands, and rebroadcasts
//! plain messages to all other connected clients. A companion client
//! binary multiplexes keyboard and socket input over one terminal.

pub mod command;
pub mod config;
pub mod error;
pub mod line;
pub mod logging;
pub mod registry;
pub mod server;

pub use config::Config;
pub use error::{RelayError, Result};
pub use logging::{LogControl, LogLevel};
pub use registry::{ClientId, ClientRegistry, RegistryFull};
pub use server::{ChatListener, Relay};
