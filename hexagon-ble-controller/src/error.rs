use uuid::Uuid;

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Write,
    Subscribe,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Write => f.write_str("write"),
            Operation::Subscribe => f.write_str("subscribe"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to {address} after {attempts} attempts: {source}")]
    ConnectionFailed {
        address: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },
    #[error("not connected; call connect() first")]
    NotConnected,
    #[error("{operation} on {characteristic} at {address} failed: {source}")]
    Transport {
        address: String,
        operation: Operation,
        characteristic: Uuid,
        #[source]
        source: TransportError,
    },
    #[error(transparent)]
    Protocol(#[from] hexagon_proto::ProtoError),
}
