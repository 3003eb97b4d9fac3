//! Device session: connect with retry, write frames, wait for sync replies
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnected
//! ```
//!
//! While connected the session may or may not hold a notification
//! subscription; commands work either way, waiting for state does not.

use std::time::Duration;

use data_encoding::HEXLOWER;
use futures::{FutureExt, StreamExt};
use hexagon_proto::{
    Assembled, Command, FirmwareProfile, FrameAssembler, StateReading, interpret,
};
use uuid::Uuid;

use crate::config::LightConfig;
use crate::error::{Error, Operation, Result};
use crate::retry::RetryPolicy;
use crate::transport::{Connection, NotificationStream, Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Exclusive owner of one lamp connection
pub struct Session<T: Transport> {
    transport: T,
    config: LightConfig,
    profile: FirmwareProfile,
    state: SessionState,
    link: Option<Link<T::Connection>>,
}

struct Link<C> {
    address: String,
    connection: C,
    with_response: bool,
    notifications: Option<NotificationStream>,
    assembler: FrameAssembler,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: LightConfig, profile: FirmwareProfile) -> Self {
        Self {
            transport,
            config,
            profile,
            state: SessionState::Disconnected,
            link: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.notifications.is_some())
    }

    pub fn address(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.address.as_str())
    }

    pub fn profile(&self) -> &FirmwareProfile {
        &self.profile
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Connect using the configured retry policy
    pub async fn connect(&mut self, address: &str) -> Result<()> {
        let policy = self.config.retry;
        self.connect_with(address, &policy).await
    }

    pub async fn connect_with(&mut self, address: &str, policy: &RetryPolicy) -> Result<()> {
        if let Some(current) = self.address() {
            if current == address {
                return Ok(());
            }
            self.disconnect().await;
        }

        self.state = SessionState::Connecting;
        let attempts = policy.attempts();
        let mut last_error: Option<TransportError> = None;

        for attempt in 1..=attempts {
            tracing::debug!(address, attempt, attempts, "connecting");

            let outcome =
                tokio::time::timeout(self.config.connect_timeout, self.transport.connect(address))
                    .await;
            match outcome {
                Ok(Ok(connection)) => {
                    self.link = Some(self.establish(address, connection).await);
                    self.state = SessionState::Connected;
                    tracing::info!(address, attempt, "connected");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::warn!(address, attempt, "connect failed: {e}");
                    last_error = Some(e);
                }
                Err(_) => {
                    tracing::warn!(address, attempt, "connect timed out");
                    last_error = Some(
                        format!("connect timed out after {:?}", self.config.connect_timeout)
                            .into(),
                    );
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.backoff.delay(attempt)).await;
            }
        }

        self.state = SessionState::Disconnected;
        Err(Error::ConnectionFailed {
            address: address.to_string(),
            attempts,
            source: last_error.unwrap_or_else(|| "no connect attempt made".into()),
        })
    }

    async fn establish(&self, address: &str, connection: T::Connection) -> Link<T::Connection> {
        let with_response = !connection.supports_write_without_response(self.config.write_uuid);

        let notifications = match connection.subscribe(self.config.notify_uuid).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                tracing::warn!(
                    address,
                    characteristic = %self.config.notify_uuid,
                    "notification subscribe failed, state reads will be unknown: {e}"
                );
                None
            }
        };

        Link {
            address: address.to_string(),
            connection,
            with_response,
            notifications,
            assembler: FrameAssembler::new(),
        }
    }

    /// Write one command; returns once the transport accepted the frame
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        let bytes = command.encode(&self.profile)?;
        let link = self.link.as_ref().ok_or(Error::NotConnected)?;
        tracing::debug!(?command, frame = %HEXLOWER.encode(&bytes), "send");
        link.write(self.config.write_uuid, &bytes).await
    }

    /// Write one command and wait up to `timeout` for a sync reply
    ///
    /// Silence is not an error: the lamp does not answer most commands, so a
    /// timeout yields [`StateReading::Unknown`]. The connection stays open.
    pub async fn send_and_wait(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<StateReading> {
        let bytes = command.encode(&self.profile)?;
        let link = self.link.as_mut().ok_or(Error::NotConnected)?;

        link.drain_stale();
        tracing::debug!(?command, frame = %HEXLOWER.encode(&bytes), "send, awaiting reply");
        link.write(self.config.write_uuid, &bytes).await?;

        Ok(link.wait_for_state(timeout, &self.profile).await)
    }

    /// Subscribe again after a failed or closed subscription
    pub async fn resubscribe(&mut self) -> Result<()> {
        let characteristic = self.config.notify_uuid;
        let link = self.link.as_mut().ok_or(Error::NotConnected)?;

        let stream = link
            .connection
            .subscribe(characteristic)
            .await
            .map_err(|source| Error::Transport {
                address: link.address.clone(),
                operation: Operation::Subscribe,
                characteristic,
                source,
            })?;

        link.notifications = Some(stream);
        link.assembler.reset();
        Ok(())
    }

    /// Always ends `Disconnected`; transport errors are only logged
    pub async fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        let Some(link) = self.link.take() else {
            return;
        };

        drop(link.notifications);
        match link.connection.disconnect().await {
            Ok(()) => tracing::info!(address = %link.address, "disconnected"),
            Err(e) => tracing::warn!(address = %link.address, "disconnect failed: {e}"),
        }
    }
}

impl<C: Connection> Link<C> {
    async fn write(&self, characteristic: Uuid, bytes: &[u8]) -> Result<()> {
        self.connection
            .write(characteristic, bytes, self.with_response)
            .await
            .map_err(|source| Error::Transport {
                address: self.address.clone(),
                operation: Operation::Write,
                characteristic,
                source,
            })
    }

    /// Drop notifications that arrived before the upcoming request
    fn drain_stale(&mut self) {
        self.assembler.reset();
        let Some(stream) = self.notifications.as_mut() else {
            return;
        };

        loop {
            match stream.next().now_or_never() {
                Some(Some(chunk)) => {
                    tracing::trace!(raw = %HEXLOWER.encode(&chunk), "dropping stale notification")
                }
                Some(None) => {
                    tracing::warn!(address = %self.address, "notification stream closed");
                    self.notifications = None;
                    return;
                }
                None => return,
            }
        }
    }

    async fn wait_for_state(
        &mut self,
        timeout: Duration,
        profile: &FirmwareProfile,
    ) -> StateReading {
        let Some(stream) = self.notifications.as_mut() else {
            tracing::debug!("no notification subscription");
            return StateReading::Unknown;
        };

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let chunk = match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => {
                    tracing::warn!(address = %self.address, "notification stream closed");
                    self.notifications = None;
                    return StateReading::Unknown;
                }
                Err(_) => {
                    tracing::debug!("no sync reply within {timeout:?}");
                    return StateReading::Unknown;
                }
            };

            match self.assembler.push(&chunk) {
                Assembled::Frame(frame) => {
                    let state = interpret(&frame, profile);
                    tracing::debug!(?state, "sync reply");
                    return StateReading::Reported(state);
                }
                Assembled::Pending => {
                    tracing::trace!(raw = %HEXLOWER.encode(&chunk), "partial notification")
                }
                Assembled::Discarded(reason) => {
                    tracing::warn!(
                        raw = %HEXLOWER.encode(&chunk),
                        "discarding notification: {reason}"
                    )
                }
            }
        }
    }
}
