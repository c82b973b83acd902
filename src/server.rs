use std::net::SocketAddr;

use log::{error, info, trace};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

use crate::{
    error::RconError,
    packet::{self, Direction, Packet, PacketType},
};

const KNOWN_COMMANDS: &str = "echo, version, help, commands";

/// A small rcon server that authenticates against a fixed password and
/// answers a handful of commands, `echo` being the useful one. It exists so
/// the client has a real socket to talk to in tests and demos; it is not a
/// game server.
pub struct Server {
    listener: TcpListener,
    password: String,
}

impl Server {
    pub async fn bind(addr: &str, password: &str) -> Result<Self, RconError> {
        let listener = TcpListener::bind(addr).await.map_err(RconError::BindError)?;

        Ok(Server {
            listener,
            password: password.to_string(),
        })
    }

    /// The address the server actually listens on. Mostly interesting after
    /// binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, RconError> {
        self.listener.local_addr().map_err(RconError::BindError)
    }

    /// Accept connections until the task is aborted. Each connection runs its
    /// own auth handshake and command loop, independent of the others.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.listener.accept().await {
                    Ok((stream, addr)) => {
                        let password = self.password.clone();
                        tokio::spawn(async move {
                            if let Err(e) = Self::serve_connection(stream, addr, &password).await {
                                trace!("connection from {} ended: {:?}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("{:?}", e),
                }
            }
        })
    }

    /// Convenience for binding and starting in one go, logging the address.
    pub async fn start_on(addr: &str, password: &str) -> Result<JoinHandle<()>, RconError> {
        let server = Self::bind(addr, password).await?;
        info!("server running on {}", server.local_addr()?);
        Ok(server.start())
    }

    async fn serve_connection(
        mut stream: TcpStream,
        addr: SocketAddr,
        password: &str,
    ) -> Result<(), RconError> {
        info!("accept from {:?}", addr);

        // first packet has to be the login
        let auth = packet::read_from(&mut stream, Direction::Serverbound).await?;
        if auth.packet_type() != PacketType::Auth {
            return Err(RconError::AuthenticationError);
        }

        if auth.body() != password {
            // srcds signals a bad password with an auth response carrying ID -1
            let reply = Packet::new(-1, PacketType::AuthResponse, "");
            stream
                .write_all(&reply.pack())
                .await
                .map_err(RconError::SendError)?;
            return Err(RconError::AuthenticationError);
        }

        let reply = Packet::new(auth.id(), PacketType::AuthResponse, "");
        stream
            .write_all(&reply.pack())
            .await
            .map_err(RconError::SendError)?;
        trace!("{} authenticated", addr);

        loop {
            let request = packet::read_from(&mut stream, Direction::Serverbound).await?;
            if request.packet_type() != PacketType::Exec {
                continue;
            }

            trace!("{} exec {}: {:?}", addr, request.id(), request.body());
            let output = dispatch(request.body());
            let response = Packet::new(request.id(), PacketType::Response, output);
            stream
                .write_all(&response.pack())
                .await
                .map_err(RconError::SendError)?;
        }
    }
}

/// Route a command line to its output. Unknown commands answer with an error
/// string rather than dropping the connection.
fn dispatch(command_line: &str) -> String {
    let trimmed = command_line.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let (name, arguments) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (trimmed, ""),
    };

    match name.to_lowercase().as_str() {
        "echo" => arguments.to_string(),
        "version" => format!("srcon {}", env!("CARGO_PKG_VERSION")),
        "help" | "commands" => format!("available commands: {}", KNOWN_COMMANDS),
        "who" => String::new(), // nobody is ever online on a test server
        other => format!("Unknown command: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_returns_arguments_verbatim() {
        assert_eq!(dispatch("echo hello world"), "hello world");
        assert_eq!(dispatch("echo  spaced  out"), "spaced  out");
    }

    #[test]
    fn empty_command_returns_empty_output() {
        assert_eq!(dispatch(""), "");
        assert_eq!(dispatch("   "), "");
    }

    #[test]
    fn unknown_command_is_reported_not_dropped() {
        assert_eq!(
            dispatch("nonexistentcommand12345"),
            "Unknown command: nonexistentcommand12345"
        );
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(dispatch("ECHO loud"), "loud");
    }
}
