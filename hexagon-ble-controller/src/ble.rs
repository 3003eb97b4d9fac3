//! btleplug-backed transport
//!
//! Locates the lamp by address (or advertised name), connects and exposes the
//! control service characteristics to the session.

use std::collections::BTreeSet;
use std::time::Duration;

use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use uuid::Uuid;

use crate::transport::{Connection, NotificationStream, Transport, TransportError};

const SCAN_POLL: Duration = Duration::from_millis(250);

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters
        .into_iter()
        .next()
        .ok_or_else(|| "No Bluetooth adapter found".into())
}

pub struct BtleplugTransport {
    adapter: Adapter,
    service_uuid: Uuid,
    scan_timeout: Duration,
}

impl BtleplugTransport {
    pub async fn new(service_uuid: Uuid, scan_timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self::with_adapter(get_adapter().await?, service_uuid, scan_timeout))
    }

    pub fn with_adapter(adapter: Adapter, service_uuid: Uuid, scan_timeout: Duration) -> Self {
        Self {
            adapter,
            service_uuid,
            scan_timeout,
        }
    }

    /// Scan until a peripheral with the given address or local name shows up
    async fn find_peripheral(&self, target: &str) -> Result<Peripheral, TransportError> {
        self.adapter.start_scan(ScanFilter::default()).await?;

        let found = tokio::time::timeout(self.scan_timeout, self.poll_peripherals(target)).await;

        if let Err(e) = self.adapter.stop_scan().await {
            tracing::debug!("stop_scan failed: {e}");
        }

        match found {
            Ok(result) => result,
            Err(_) => {
                Err(format!("No device {target} found within {:?}", self.scan_timeout).into())
            }
        }
    }

    async fn poll_peripherals(&self, target: &str) -> Result<Peripheral, TransportError> {
        loop {
            for peripheral in self.adapter.peripherals().await? {
                if matches_target(&peripheral, target).await? {
                    return Ok(peripheral);
                }
            }
            tokio::time::sleep(SCAN_POLL).await;
        }
    }
}

async fn matches_target(peripheral: &Peripheral, target: &str) -> Result<bool, TransportError> {
    if peripheral.address().to_string().eq_ignore_ascii_case(target) {
        return Ok(true);
    }
    let name = peripheral
        .properties()
        .await?
        .and_then(|props| props.local_name)
        .unwrap_or_default();
    Ok(!name.is_empty() && name == target)
}

#[async_trait::async_trait]
impl Transport for BtleplugTransport {
    type Connection = BtleplugConnection;

    async fn connect(&self, address: &str) -> Result<BtleplugConnection, TransportError> {
        let device = self.find_peripheral(address).await?;
        tracing::debug!(address, "found device, connecting");

        device.connect().await?;
        device.discover_services().await?;

        if !device.services().iter().any(|s| s.uuid == self.service_uuid) {
            if let Err(e) = device.disconnect().await {
                tracing::debug!("disconnect after missing service failed: {e}");
            }
            return Err(format!("Service not found: {}", self.service_uuid).into());
        }

        Ok(BtleplugConnection {
            characteristics: device.characteristics(),
            device,
        })
    }
}

pub struct BtleplugConnection {
    device: Peripheral,
    characteristics: BTreeSet<Characteristic>,
}

impl BtleplugConnection {
    fn characteristic(&self, uuid: Uuid) -> Result<&Characteristic, TransportError> {
        self.characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .ok_or_else(|| format!("Characteristic not found: {uuid}").into())
    }
}

#[async_trait::async_trait]
impl Connection for BtleplugConnection {
    async fn write(
        &self,
        characteristic: Uuid,
        bytes: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        let ch = self.characteristic(characteristic)?;
        self.device.write(ch, bytes, write_type).await?;
        Ok(())
    }

    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError> {
        let ch = self.characteristic(characteristic)?;
        self.device.subscribe(ch).await?;

        let notifications = self.device.notifications().await?;
        Ok(Box::pin(notifications.filter_map(move |n| {
            futures::future::ready((n.uuid == characteristic).then_some(n.value))
        })))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.device.disconnect().await?;
        Ok(())
    }

    fn supports_write_without_response(&self, characteristic: Uuid) -> bool {
        self.characteristics
            .iter()
            .find(|c| c.uuid == characteristic)
            .is_some_and(|c| c.properties.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE))
    }
}
