//! TCP server components: the listener and the relay event loop.

mod listener;
mod relay;

pub use listener::ChatListener;
pub use relay::Relay;
