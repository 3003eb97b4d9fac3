use std::time::Duration;

use hexagon_proto::ble::{NOTIFY_UUID, SERVICE_UUID, WRITE_UUID};
use uuid::Uuid;

use crate::retry::RetryPolicy;

/// Where to talk to the lamp and how hard to try
#[derive(Debug, Clone)]
pub struct LightConfig {
    pub service_uuid: Uuid,
    pub write_uuid: Uuid,
    pub notify_uuid: Uuid,
    /// Bound on a single transport connect attempt
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            service_uuid: parse_uuid(SERVICE_UUID),
            write_uuid: parse_uuid(WRITE_UUID),
            notify_uuid: parse_uuid(NOTIFY_UUID),
            connect_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

impl LightConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Parse UUID string from hexagon_proto
fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("invalid UUID in hexagon_proto")
}
