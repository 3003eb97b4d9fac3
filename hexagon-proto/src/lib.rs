//! Hexagon Light wire protocol - frames, commands, scenes and sync replies
//!
//! Pure encoding and decoding; nothing in this crate touches a radio.

pub mod assembler;
pub mod ble;
pub mod color;
pub mod command;
pub mod frame;
pub mod profile;
pub mod scene;
pub mod state;

pub use assembler::{Assembled, FrameAssembler};
pub use command::Command;
pub use frame::{CommandId, Frame, Header, Invalid, Parse, encode, try_parse};
pub use profile::{FirmwareProfile, TG609};
pub use scene::{SceneEntry, SceneRegistry};
pub use state::{DeviceState, StateReading, interpret};

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("payload of {len} bytes does not fit in a frame")]
    InvalidPayload { len: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown scene: {0}")]
    UnknownScene(String),
}
