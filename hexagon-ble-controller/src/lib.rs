//! Hexagon Light BLE Controller
//!
//! Connects to a Hexagon lamp over BLE GATT, sends protocol commands and
//! reads sync replies back from the notify characteristic.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use hexagon_ble_controller::{HexagonLight, LightConfig};
//! use hexagon_proto::TG609;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut light = HexagonLight::open(
//!         "FF:FF:11:52:AB:BD",
//!         LightConfig::default(),
//!         TG609,
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//!
//!     light.connect().await?;
//!     light.turn_on().await?;
//!     light.set_scene_by_name("aurora", Some(128)).await?;
//!     println!("{:?}", light.get_state(Duration::from_secs(2)).await?);
//!     light.disconnect().await;
//!
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod config;
pub mod error;
pub mod light;
pub mod retry;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use ble::BtleplugTransport;
pub use config::LightConfig;
pub use error::{Error, Operation, Result};
pub use light::HexagonLight;
pub use retry::{Backoff, RetryPolicy};
pub use session::{Session, SessionState};
pub use transport::{Connection, Transport};
