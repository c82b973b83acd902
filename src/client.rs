use crate::{
    error::RconError,
    packet::{self, Direction, Packet, PacketType},
};
use log::trace;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// How long to wait for a response packet before giving up on a read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Simple asynchronous rcon client. Call `connect()` to establish a connection
/// and authenticate. The client should be `mut` as it keeps a counter used for
/// [Packet] IDs.
///
/// One request is in flight at a time: every command waits for its response
/// packet before the next can be sent. There is no reconnect path either; once
/// a connection errors out, drop the client and `connect()` again.
///
/// ## Example
/// ```no_run
/// use srcon::client::Client;
/// use std::error::Error;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn Error>> {
///     let host = "127.0.0.1:25575";
///     // client must be mutable so we can increment packet IDs
///     let mut client = Client::connect(host, "<put rcon password here>").await?;
///     let response = client.command("echo hi").await?;
///
///     assert_eq!(response.body(), "hi");
///     Ok(())
/// }
/// ```
pub struct Client {
    next_packet_id: i32,
    read_timeout: Duration,
    stream: TcpStream,
}

/// A single response packet, exposed with its correlation id and type so
/// callers can check for themselves whether it matches what they sent.
pub struct Response {
    id: i32,
    packet_type: PacketType,
    body: String,
}

impl Response {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn body(&self) -> &str {
        self.body.as_ref()
    }
}

impl Client {
    pub async fn connect(host: &str, password: &str) -> Result<Self, RconError> {
        Self::connect_with_timeout(host, password, DEFAULT_READ_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        host: &str,
        password: &str,
        read_timeout: Duration,
    ) -> Result<Self, RconError> {
        let stream = TcpStream::connect(host)
            .await
            .map_err(RconError::UnreachableHost)?;

        trace!("opened tcp stream to {}, attempting auth", host);

        let mut client = Client {
            next_packet_id: 100, // IDs 1-99 are reserved for auth (even though we realistically only need one)
            read_timeout,
            stream,
        };
        client.auth(password).await?;

        trace!("auth complete");

        Ok(client)
    }

    /// Run a rcon command asynchronously, with the packet ID assigned from the
    /// connection's own counter. Waits for exactly one response packet.
    pub async fn command(&mut self, command: &str) -> Result<Response, RconError> {
        self.next_packet_id += 1;
        let id = self.next_packet_id;
        self.exec(command, id).await
    }

    /// Run a rcon command with a caller-chosen packet ID. If the response
    /// carries the matching ID and type the body comes back with trailing
    /// nulls and whitespace trimmed; anything else is returned verbatim for
    /// the caller to inspect.
    pub async fn exec(&mut self, command: &str, id: i32) -> Result<Response, RconError> {
        let command_packet = Packet::new(id, PacketType::Exec, command);

        trace!("sending command packet {} to server", id);
        self.write_packet(&command_packet).await?;

        let response = self.read_packet().await?;
        trace!(
            "received response for packet id {} (sent {})",
            response.id(),
            id
        );

        let body = if response.id() == id && response.packet_type() == PacketType::Response {
            response.body().trim_matches('\0').trim().to_string()
        } else {
            response.body().to_string()
        };

        Ok(Response {
            id: response.id(),
            packet_type: response.packet_type(),
            body,
        })
    }

    async fn auth(&mut self, password: &str) -> Result<(), RconError> {
        let auth_packet = Packet::new(1, PacketType::Auth, password);

        trace!("sending auth packet to server");
        self.write_packet(&auth_packet).await?;

        let response = self.read_packet().await?;
        trace!("received auth response for packet id {}", response.id());

        // srcds marks a failed login by responding with ID -1
        if response.id() == -1 || response.packet_type() != PacketType::AuthResponse {
            return Err(RconError::AuthenticationError);
        }

        Ok(())
    }

    async fn write_packet(&mut self, packet: &Packet) -> Result<(), RconError> {
        self.stream
            .write_all(&packet.pack())
            .await
            .map_err(RconError::SendError)
    }

    async fn read_packet(&mut self) -> Result<Packet, RconError> {
        timeout(
            self.read_timeout,
            packet::read_from(&mut self.stream, Direction::Clientbound),
        )
        .await?
    }
}
