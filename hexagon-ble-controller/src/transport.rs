//! The BLE capability the session drives
//!
//! Implemented by [`crate::ble::BtleplugTransport`] for real hardware and by
//! an in-memory fake in tests.

use std::pin::Pin;

use futures::Stream;
use uuid::Uuid;

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Notification values from one characteristic; dropping it unsubscribes
pub type NotificationStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    type Connection: Connection;

    async fn connect(&self, address: &str) -> Result<Self::Connection, TransportError>;
}

#[async_trait::async_trait]
pub trait Connection: Send + Sync {
    async fn write(
        &self,
        characteristic: Uuid,
        bytes: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError>;

    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError>;

    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Whether the characteristic accepts write-without-response
    fn supports_write_without_response(&self, characteristic: Uuid) -> bool;
}
