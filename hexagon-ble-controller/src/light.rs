//! Lamp-level API on top of [`Session`]

use std::time::Duration;

use hexagon_proto::{Command, FirmwareProfile, SceneEntry, StateReading};

use crate::ble::BtleplugTransport;
use crate::config::LightConfig;
use crate::error::Result;
use crate::session::{Session, SessionState};
use crate::transport::Transport;

pub struct HexagonLight<T: Transport = BtleplugTransport> {
    address: String,
    session: Session<T>,
}

impl HexagonLight<BtleplugTransport> {
    /// Lamp on the default Bluetooth adapter
    pub async fn open(
        address: &str,
        config: LightConfig,
        profile: FirmwareProfile,
        scan_timeout: Duration,
    ) -> std::result::Result<Self, crate::transport::TransportError> {
        let transport = BtleplugTransport::new(config.service_uuid, scan_timeout).await?;
        Ok(Self::new(address, transport, config, profile))
    }
}

impl<T: Transport> HexagonLight<T> {
    pub fn new(address: &str, transport: T, config: LightConfig, profile: FirmwareProfile) -> Self {
        Self {
            address: address.to_string(),
            session: Session::new(transport, config, profile),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.session.state() == SessionState::Connected
    }

    pub async fn connect(&mut self) -> Result<()> {
        self.session.connect(&self.address).await
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await
    }

    pub async fn turn_on(&mut self) -> Result<()> {
        self.session.send(&Command::Power(true)).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.session.send(&Command::Power(false)).await
    }

    pub async fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<()> {
        let command = Command::rgb(r, g, b, self.session.profile());
        self.session.send(&command).await
    }

    pub async fn set_brightness(&mut self, percent: i64) -> Result<()> {
        self.session.send(&Command::brightness(percent)?).await
    }

    /// Scene by raw index
    ///
    /// The index is not checked against the profile's scene table, so effects
    /// the table does not name can still be selected. Use
    /// [`set_scene_by_name`](Self::set_scene_by_name) for validated input.
    pub async fn set_scene(&mut self, index: u16, speed: Option<i64>) -> Result<()> {
        let speed = speed.map(Command::scene_speed).transpose()?;
        self.session.send(&Command::Scene(index)).await?;
        if let Some(speed) = speed {
            self.session.send(&speed).await?;
        }
        Ok(())
    }

    pub async fn set_scene_by_name(&mut self, name: &str, speed: Option<i64>) -> Result<()> {
        let index = self.session.profile().scenes.resolve(name)?;
        self.set_scene(index, speed).await
    }

    pub async fn set_scene_speed(&mut self, speed: i64) -> Result<()> {
        self.session.send(&Command::scene_speed(speed)?).await
    }

    /// Ask for a sync reply and wait up to `wait` for it
    pub async fn get_state(&mut self, wait: Duration) -> Result<StateReading> {
        if self.is_connected() && !self.session.is_subscribed() {
            if let Err(e) = self.session.resubscribe().await {
                tracing::warn!("resubscribe failed: {e}");
            }
        }
        self.session
            .send_and_wait(&Command::StatusRequest, wait)
            .await
    }

    pub fn list_scenes(&self) -> &'static [SceneEntry] {
        self.session.profile().scenes.list()
    }
}
