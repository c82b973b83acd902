//! Pure Rust async implementation of the [Source RCON protocol](https://developer.valvesoftware.com/wiki/Source_RCON_Protocol):
//! a wire codec, a small client, and an echo server to test against.
pub mod client;
pub mod error;
pub mod packet;
pub mod server;

/// Default address a rcon server listens on.
pub const DEFAULT_ADDR: &str = "127.0.0.1:25575";
