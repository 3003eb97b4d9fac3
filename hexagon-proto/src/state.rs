//! Sync replies to device state
//!
//! The status payload is only partly understood, so interpretation never
//! fails: unknown layouts leave the defaults and keep the raw bytes.

use crate::frame::{CommandId, Frame, Header};
use crate::profile::FirmwareProfile;

/// Best-effort snapshot decoded from one notification
#[derive(serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub is_on: bool,
    pub brightness_percent: Option<u8>,
    /// Complete notification frame as received
    #[serde(serialize_with = "hex")]
    pub raw: Vec<u8>,
}

/// Outcome of waiting for a notification
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StateReading {
    Reported(DeviceState),
    /// Nothing interpretable arrived in time; many commands never get a reply
    Unknown,
}

impl StateReading {
    pub fn state(&self) -> Option<&DeviceState> {
        match self {
            StateReading::Reported(state) => Some(state),
            StateReading::Unknown => None,
        }
    }
}

pub fn interpret(frame: &Frame, profile: &FirmwareProfile) -> DeviceState {
    let mut state = DeviceState {
        raw: frame.as_bytes().to_vec(),
        ..DeviceState::default()
    };
    let payload = frame.payload();

    match (frame.header(), frame.command()) {
        // TG609: power at [0], brightness u16 at [1..3] in the 0x05 encoding
        (Header::Sync, _) => {
            if let Some(&power) = payload.first() {
                state.is_on = power != 0;
            }
            if let [_, hi, lo, ..] = *payload {
                state.brightness_percent =
                    (profile.brightness_from_wire)(u16::from_be_bytes([hi, lo]));
            }
        }
        // Echoed status: power at [0], brightness + 5 at [1]
        (Header::Request, CommandId::Status) => {
            if let Some(&power) = payload.first() {
                state.is_on = power != 0;
            }
            if let Some(&b) = payload.get(1) {
                state.brightness_percent = b.checked_sub(5).filter(|p| *p <= 100);
            }
        }
        _ => {}
    }

    state
}

fn hex<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&data_encoding::HEXLOWER.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{self, Parse, checksum};
    use crate::profile::TG609;

    fn frame_from(bytes: &[u8]) -> Frame {
        match frame::try_parse(bytes) {
            Parse::Complete(f) => f,
            other => panic!("{other:?}"),
        }
    }

    fn balanced(mut bytes: Vec<u8>) -> Vec<u8> {
        bytes[3] = (bytes.len() + 1) as u8;
        bytes.push(checksum(&bytes));
        bytes
    }

    #[test]
    fn tg609_sync_fixture() {
        let raw = [
            0x56, 0x00, 0xff, 0x06, 0x01, 0x00, 0xbe, 0x00, 0x08, 0x17, 0x7f, 0x00, 0x08, 0x17,
            0x7f, 0x00, 0x50, 0x50, 0x09,
        ];
        let frame = match frame::try_parse_sync_reply(&raw) {
            Parse::Complete(f) => f,
            other => panic!("{other:?}"),
        };
        let state = interpret(&frame, &TG609);
        assert!(state.is_on);
        assert_eq!(state.brightness_percent, Some(14));
        assert_eq!(state.raw, raw);
    }

    #[test]
    fn echoed_status_frame() {
        let bytes = balanced(vec![0x55, 0x00, 0xff, 0x00, 0x01, 85]);
        let state = interpret(&frame_from(&bytes), &TG609);
        assert!(state.is_on);
        assert_eq!(state.brightness_percent, Some(80));
    }

    #[test]
    fn out_of_range_brightness_is_dropped() {
        let bytes = balanced(vec![0x56, 0x00, 0xff, 0x00, 0x00, 0x27, 0x10]);
        let state = interpret(&frame_from(&bytes), &TG609);
        assert!(!state.is_on);
        assert_eq!(state.brightness_percent, None);
    }

    #[test]
    fn empty_status_payload_keeps_defaults() {
        let bytes = balanced(vec![0x56, 0x00, 0xff, 0x00]);
        let state = interpret(&frame_from(&bytes), &TG609);
        assert_eq!(
            state,
            DeviceState {
                is_on: false,
                brightness_percent: None,
                raw: bytes,
            }
        );
    }

    #[test]
    fn other_commands_only_keep_raw() {
        let bytes = balanced(vec![0x55, 0x01, 0xff, 0x00, 0x01]);
        let state = interpret(&frame_from(&bytes), &TG609);
        assert!(!state.is_on);
        assert_eq!(state.brightness_percent, None);
        assert_eq!(state.raw, bytes);
    }
}
