use crate::error::RconError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// The four packet types defined by the Source RCON protocol. `Exec` and
/// `AuthResponse` share the wire value 2 and can only be told apart by which
/// way the packet is travelling, hence [Direction].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    // SERVERDATA_AUTH
    Auth,
    // SERVERDATA_EXECCOMMAND
    Exec,
    // SERVERDATA_AUTH_RESPONSE
    AuthResponse,
    // SERVERDATA_RESPONSE_VALUE
    Response,
}

/// Which way a packet is travelling. Needed to resolve the type value 2,
/// which means `Exec` when sent to the server and `AuthResponse` when sent
/// back from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to server (auth requests and commands).
    Serverbound,
    /// Server to client (auth responses and command output).
    Clientbound,
}

impl PacketType {
    pub fn to_le_bytes(&self) -> [u8; 4] {
        let type_value: i32 = match self {
            PacketType::Auth => 3,
            PacketType::Exec => 2,
            PacketType::AuthResponse => 2,
            PacketType::Response => 0,
        };
        type_value.to_le_bytes()
    }

    pub fn from_wire(value: i32, direction: Direction) -> Result<Self, RconError> {
        match (value, direction) {
            (3, Direction::Serverbound) => Ok(PacketType::Auth),
            (2, Direction::Serverbound) => Ok(PacketType::Exec),
            (2, Direction::Clientbound) => Ok(PacketType::AuthResponse),
            (0, _) => Ok(PacketType::Response),
            (unknown, _) => Err(RconError::UnknownPacketType(unknown)),
        }
    }
}

pub struct Packet {
    id: i32,
    packet_type: PacketType,
    body: String,
}

impl Packet {
    /// Size of a packet with an empty body: id (4) + type (4) + two null
    /// terminators. Also the smallest size a well-formed packet can declare.
    pub const BASE_PACKET_SIZE: i32 = 10;
    /// Upper bound on the declared size; anything larger is treated as a
    /// garbage stream rather than a packet.
    pub const MAX_PACKET_SIZE: i32 = 4096;

    pub fn new(id: i32, packet_type: PacketType, body: impl Into<String>) -> Self {
        Packet {
            id,
            packet_type,
            body: body.into(),
        }
    }

    // Since the only one of these values that can change in length is the body,
    // an easy way to calculate the size of a packet is to find the byte-length
    // of the packet body, then add 10 to it.
    pub fn size(&self) -> i32 {
        self.body.len() as i32 + Self::BASE_PACKET_SIZE
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn body(&self) -> &str {
        self.body.as_ref()
    }

    pub fn pack(&self) -> Vec<u8> {
        // Size, ID, Type, Body, Terminator
        let mut payload = Vec::<u8>::new();
        payload.extend_from_slice(&self.size().to_le_bytes());
        payload.extend_from_slice(&self.id().to_le_bytes());
        payload.extend_from_slice(&self.packet_type().to_le_bytes());
        payload.extend_from_slice(self.body().as_bytes());
        // null terminate the body (C++ interop 🤢), then null terminate the entire package
        payload.extend_from_slice(&[0u8, 0u8]);
        payload
    }

    /// Parse a packet out of the bytes following the size prefix: id at 0..4,
    /// type at 4..8, body from 8 up to its null terminator. The body stops at
    /// the first null even if more bytes follow, and undecodable UTF-8 is
    /// substituted rather than rejected.
    pub fn unpack(payload: &[u8], direction: Direction) -> Result<Self, RconError> {
        let id = i32::from_le_bytes(payload.get(0..4).unwrap_or_default().try_into()?);
        let type_value = i32::from_le_bytes(payload.get(4..8).unwrap_or_default().try_into()?);
        let packet_type = PacketType::from_wire(type_value, direction)?;

        let rest = &payload[8..];
        let body_end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        let body = String::from_utf8_lossy(&rest[..body_end]).into_owned();

        Ok(Packet {
            id,
            packet_type,
            body,
        })
    }
}

/// Read one framed packet off a stream: a 4 byte little-endian size prefix,
/// then exactly that many bytes. Declared sizes outside
/// `BASE_PACKET_SIZE..=MAX_PACKET_SIZE` fail before any further read, and a
/// connection that closes mid-frame fails with [RconError::ReceiveError].
pub async fn read_from<R>(stream: &mut R, direction: Direction) -> Result<Packet, RconError>
where
    R: AsyncRead + Unpin,
{
    let mut size_buf = [0u8; 4];
    stream
        .read_exact(&mut size_buf)
        .await
        .map_err(RconError::ReceiveError)?;
    let size = i32::from_le_bytes(size_buf);

    if !(Packet::BASE_PACKET_SIZE..=Packet::MAX_PACKET_SIZE).contains(&size) {
        return Err(RconError::InvalidPacketSize(size));
    }

    let mut payload = vec![0u8; size as usize];
    stream
        .read_exact(&mut payload)
        .await
        .map_err(RconError::ReceiveError)?;

    Packet::unpack(&payload, direction)
}
