//! In-memory lamp used by the session and facade tests

use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::mpsc::{UnboundedSender, unbounded};
use uuid::Uuid;

use crate::transport::{Connection, NotificationStream, Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Write {
    pub characteristic: Uuid,
    pub bytes: Vec<u8>,
    pub with_response: bool,
}

#[derive(Default)]
struct Lamp {
    failing_connects: u32,
    hanging_connects: bool,
    connect_attempts: u32,
    disconnects: u32,
    write_without_response: bool,
    failing_writes: bool,
    failing_subscribe: bool,
    status_reply: Vec<Vec<u8>>,
    writes: Vec<Write>,
    notify_tx: Option<UnboundedSender<Vec<u8>>>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeLamp {
    inner: Arc<Mutex<Lamp>>,
}

impl FakeLamp {
    pub fn new() -> Self {
        Self::default()
    }

    fn lamp(&self) -> MutexGuard<'_, Lamp> {
        self.inner.lock().expect("fake lamp mutex poisoned")
    }

    pub fn failing_connects(self, n: u32) -> Self {
        self.lamp().failing_connects = n;
        self
    }

    pub fn hanging_connects(self) -> Self {
        self.lamp().hanging_connects = true;
        self
    }

    pub fn write_without_response(self) -> Self {
        self.lamp().write_without_response = true;
        self
    }

    pub fn failing_writes(self) -> Self {
        self.lamp().failing_writes = true;
        self
    }

    pub fn failing_subscribe(self) -> Self {
        self.set_subscribe_failing(true);
        self
    }

    pub fn set_subscribe_failing(&self, failing: bool) {
        self.lamp().failing_subscribe = failing;
    }

    /// Notifications sent, in order, whenever a status request is written
    pub fn replying_to_status(self, chunks: Vec<Vec<u8>>) -> Self {
        self.lamp().status_reply = chunks;
        self
    }

    pub fn notify(&self, bytes: Vec<u8>) {
        if let Some(tx) = &self.lamp().notify_tx {
            let _ = tx.unbounded_send(bytes);
        }
    }

    pub fn connect_attempts(&self) -> u32 {
        self.lamp().connect_attempts
    }

    pub fn disconnects(&self) -> u32 {
        self.lamp().disconnects
    }

    pub fn writes(&self) -> Vec<Write> {
        self.lamp().writes.clone()
    }
}

#[async_trait::async_trait]
impl Transport for FakeLamp {
    type Connection = FakeLamp;

    async fn connect(&self, _address: &str) -> Result<FakeLamp, TransportError> {
        let hang = {
            let mut lamp = self.lamp();
            lamp.connect_attempts += 1;
            if lamp.failing_connects > 0 {
                lamp.failing_connects -= 1;
                return Err("device not reachable".into());
            }
            lamp.hanging_connects
        };
        if hang {
            futures::future::pending::<()>().await;
        }
        Ok(self.clone())
    }
}

#[async_trait::async_trait]
impl Connection for FakeLamp {
    async fn write(
        &self,
        characteristic: Uuid,
        bytes: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let mut lamp = self.lamp();
        if lamp.failing_writes {
            return Err("GATT write rejected".into());
        }
        lamp.writes.push(Write {
            characteristic,
            bytes: bytes.to_vec(),
            with_response,
        });

        if bytes.get(1) == Some(&hexagon_proto::ble::commands::STATUS) {
            if let Some(tx) = &lamp.notify_tx {
                for chunk in &lamp.status_reply {
                    let _ = tx.unbounded_send(chunk.clone());
                }
            }
        }
        Ok(())
    }

    async fn subscribe(&self, _characteristic: Uuid) -> Result<NotificationStream, TransportError> {
        let mut lamp = self.lamp();
        if lamp.failing_subscribe {
            return Err("notify not permitted".into());
        }
        let (tx, rx) = unbounded();
        lamp.notify_tx = Some(tx);
        Ok(Box::pin(rx))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut lamp = self.lamp();
        lamp.disconnects += 1;
        lamp.notify_tx = None;
        Ok(())
    }

    fn supports_write_without_response(&self, _characteristic: Uuid) -> bool {
        self.lamp().write_without_response
    }
}
