//! Frame layout
//!
//! ```text
//! [0]       header   0x55 request, 0x56 sync reply
//! [1]       command
//! [2]       sequence 0xFF for unsequenced frames
//! [3]       length   total frame length, header through checksum
//! [4..n-1]  payload
//! [n-1]     checksum chosen so that the byte sum of the frame is 0xFF (mod 256)
//! ```

use crate::ProtoError;
use crate::ble::commands;

pub const HEADER_REQUEST: u8 = 0x55;
pub const HEADER_SYNC: u8 = 0x56;
pub const SEQUENCE_NONE: u8 = 0xFF;
pub const CHECKSUM_TARGET: u8 = 0xFF;

/// Header, command, sequence, length and checksum bytes
pub const FRAME_OVERHEAD: usize = 5;
pub const MAX_PAYLOAD_LEN: usize = 250;
/// The length byte caps every frame at this size
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + MAX_PAYLOAD_LEN;

/// Leading byte dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Frames we send, also echoed back by some firmware
    Request,
    /// Sync replies on TG609-class firmware
    Sync,
}

impl Header {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            HEADER_REQUEST => Some(Header::Request),
            HEADER_SYNC => Some(Header::Sync),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Header::Request => HEADER_REQUEST,
            Header::Sync => HEADER_SYNC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Status,
    Power,
    Color,
    Brightness,
    Scene,
    SceneSpeed,
    Other(u8),
}

impl From<u8> for CommandId {
    fn from(b: u8) -> Self {
        match b {
            commands::STATUS => CommandId::Status,
            commands::POWER => CommandId::Power,
            commands::COLOR => CommandId::Color,
            commands::BRIGHTNESS => CommandId::Brightness,
            commands::SCENE => CommandId::Scene,
            commands::SCENE_SPEED => CommandId::SceneSpeed,
            other => CommandId::Other(other),
        }
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> u8 {
        match id {
            CommandId::Status => commands::STATUS,
            CommandId::Power => commands::POWER,
            CommandId::Color => commands::COLOR,
            CommandId::Brightness => commands::BRIGHTNESS,
            CommandId::Scene => commands::SCENE,
            CommandId::SceneSpeed => commands::SCENE_SPEED,
            CommandId::Other(b) => b,
        }
    }
}

/// One complete protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Build an outgoing request frame
    pub fn new(command: CommandId, payload: &[u8]) -> Result<Self, ProtoError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtoError::InvalidPayload { len: payload.len() });
        }

        let length = FRAME_OVERHEAD + payload.len();
        let mut bytes = Vec::with_capacity(length);
        bytes.push(HEADER_REQUEST);
        bytes.push(command.into());
        bytes.push(SEQUENCE_NONE);
        bytes.push(length as u8);
        bytes.extend_from_slice(payload);
        bytes.push(checksum(&bytes));

        Ok(Self { bytes })
    }

    pub fn header(&self) -> Header {
        // Frames only exist with a recognized header byte
        Header::from_byte(self.bytes[0]).unwrap_or(Header::Request)
    }

    pub fn command(&self) -> CommandId {
        CommandId::from(self.bytes[1])
    }

    pub fn sequence(&self) -> u8 {
        self.bytes[2]
    }

    /// Declared length byte; for sync replies this is not always the frame length
    pub fn declared_len(&self) -> u8 {
        self.bytes[3]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[4..self.bytes.len() - 1]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build the bytes of an outgoing frame
pub fn encode(command: u8, payload: &[u8]) -> Result<Vec<u8>, ProtoError> {
    Frame::new(CommandId::from(command), payload).map(Frame::into_bytes)
}

/// Checksum byte that balances `bytes` to `CHECKSUM_TARGET`
pub fn checksum(bytes: &[u8]) -> u8 {
    CHECKSUM_TARGET.wrapping_sub(byte_sum(bytes))
}

fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Why a buffer was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    Header(u8),
    Length { declared: usize, available: usize },
    Checksum { sum: u8 },
}

impl std::fmt::Display for Invalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invalid::Header(b) => write!(f, "unknown header 0x{b:02x}"),
            Invalid::Length { declared, available } => {
                write!(f, "declared length {declared}, got {available} bytes")
            }
            Invalid::Checksum { sum } => write!(f, "byte sum 0x{sum:02x}, expected 0xff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parse {
    Complete(Frame),
    /// More bytes are needed before the frame can be judged
    Incomplete,
    Invalid(Invalid),
}

/// Parse one frame occupying the whole buffer
pub fn try_parse(buf: &[u8]) -> Parse {
    let Some(&first) = buf.first() else {
        return Parse::Incomplete;
    };
    if Header::from_byte(first).is_none() {
        return Parse::Invalid(Invalid::Header(first));
    }
    if buf.len() < FRAME_OVERHEAD {
        return Parse::Incomplete;
    }

    let declared = buf[3] as usize;
    if declared < FRAME_OVERHEAD || buf.len() > declared {
        return Parse::Invalid(Invalid::Length {
            declared,
            available: buf.len(),
        });
    }
    if buf.len() < declared {
        return Parse::Incomplete;
    }

    verify(buf)
}

/// Parse a sync reply whose byte 3 does not carry the frame length
///
/// TG609 replies such as `56 00 ff 06 01 00 be ..` are 19 bytes long with 0x06
/// in the length slot. The frame is taken to span the whole buffer and only
/// the checksum is checked.
pub fn try_parse_sync_reply(buf: &[u8]) -> Parse {
    match buf.first() {
        None => Parse::Incomplete,
        Some(&HEADER_SYNC) if buf.len() < FRAME_OVERHEAD => Parse::Incomplete,
        Some(&HEADER_SYNC) => verify(buf),
        Some(&other) => Parse::Invalid(Invalid::Header(other)),
    }
}

fn verify(buf: &[u8]) -> Parse {
    let sum = byte_sum(buf);
    if sum != CHECKSUM_TARGET {
        return Parse::Invalid(Invalid::Checksum { sum });
    }
    Parse::Complete(Frame {
        bytes: buf.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn sum(bytes: &[u8]) -> u8 {
        byte_sum(bytes)
    }

    #[test]
    fn power_on_frame() {
        let frame = encode(commands::POWER, &[0x01]).unwrap();
        assert_eq!(&frame[..5], &[0x55, 0x01, 0xFF, 0x06, 0x01]);
        assert_eq!(frame.len(), 6);
        assert_eq!(sum(&frame), 0xFF);
        // 0x55 + 0x01 + 0xFF + 0x06 + 0x01 = 0x15c
        assert_eq!(frame[5], 0xA3);
    }

    #[test]
    fn status_request_has_no_payload() {
        let frame = encode(commands::STATUS, &[]).unwrap();
        assert_eq!(&frame[..4], &[0x55, 0x00, 0xFF, 0x05]);
        assert_eq!(frame.len(), 5);
        assert_eq!(sum(&frame), 0xFF);
    }

    #[test]
    fn length_includes_payload_and_checksum() {
        let frame = encode(commands::COLOR, &[0x00, 0x01, 0x00, 0x02]).unwrap();
        assert_eq!(frame[3], 9);
        assert_eq!(frame.len(), 9);
    }

    #[test]
    fn payload_limit() {
        assert!(encode(commands::SCENE, &[0; MAX_PAYLOAD_LEN]).is_ok());
        assert!(matches!(
            encode(commands::SCENE, &[0; MAX_PAYLOAD_LEN + 1]),
            Err(ProtoError::InvalidPayload { len: 251 })
        ));
    }

    #[test]
    fn checksum_balances_every_payload_length() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for len in 0..=MAX_PAYLOAD_LEN {
            let payload: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
            let command: u8 = rng.r#gen();
            let bytes = encode(command, &payload).unwrap();
            assert_eq!(sum(&bytes), 0xFF, "len {len}");

            match try_parse(&bytes) {
                Parse::Complete(frame) => {
                    assert_eq!(u8::from(frame.command()), command);
                    assert_eq!(frame.payload(), &payload[..]);
                    assert_eq!(frame.header(), Header::Request);
                    assert_eq!(frame.sequence(), SEQUENCE_NONE);
                }
                other => panic!("len {len}: {other:?}"),
            }
        }
    }

    #[test]
    fn short_buffers_are_incomplete() {
        let bytes = encode(commands::BRIGHTNESS, &[0x00, 0x64]).unwrap();
        assert_eq!(try_parse(&[]), Parse::Incomplete);
        for cut in 1..bytes.len() {
            assert_eq!(try_parse(&bytes[..cut]), Parse::Incomplete, "cut {cut}");
        }
    }

    #[test]
    fn bad_checksum_is_invalid() {
        let mut bytes = encode(commands::POWER, &[0x00]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(
            try_parse(&bytes),
            Parse::Invalid(Invalid::Checksum { .. })
        ));
    }

    #[test]
    fn unknown_header_is_invalid() {
        assert_eq!(
            try_parse(&[0x7e, 0x00, 0x05, 0x03]),
            Parse::Invalid(Invalid::Header(0x7e))
        );
    }

    #[test]
    fn trailing_bytes_are_invalid() {
        let mut bytes = encode(commands::POWER, &[0x01]).unwrap();
        bytes.push(0x00);
        assert_eq!(
            try_parse(&bytes),
            Parse::Invalid(Invalid::Length {
                declared: 6,
                available: 7
            })
        );
    }

    #[test]
    fn sync_header_is_accepted() {
        let mut bytes = vec![HEADER_SYNC, 0x00, 0xFF, 0x08, 0x01, 0x00, 0xbe];
        bytes.push(checksum(&bytes));
        match try_parse(&bytes) {
            Parse::Complete(frame) => {
                assert_eq!(frame.header(), Header::Sync);
                assert_eq!(frame.command(), CommandId::Status);
                assert_eq!(frame.payload(), &[0x01, 0x00, 0xbe]);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn tg609_sync_reply_needs_lenient_parse() {
        let raw = [
            0x56, 0x00, 0xff, 0x06, 0x01, 0x00, 0xbe, 0x00, 0x08, 0x17, 0x7f, 0x00, 0x08, 0x17,
            0x7f, 0x00, 0x50, 0x50, 0x09,
        ];
        assert!(matches!(
            try_parse(&raw),
            Parse::Invalid(Invalid::Length { .. })
        ));
        match try_parse_sync_reply(&raw) {
            Parse::Complete(frame) => {
                assert_eq!(frame.as_bytes(), &raw);
                assert_eq!(frame.payload()[0], 0x01);
            }
            other => panic!("{other:?}"),
        }
        assert_eq!(
            try_parse_sync_reply(&encode(commands::POWER, &[1]).unwrap()),
            Parse::Invalid(Invalid::Header(HEADER_REQUEST))
        );
    }

    #[test]
    fn random_input_never_panics() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        for _ in 0..20_000 {
            let len = rng.gen_range(0..64);
            let mut buf: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
            if len > 0 && rng.gen_bool(0.5) {
                buf[0] = if rng.gen_bool(0.5) { HEADER_REQUEST } else { HEADER_SYNC };
            }
            if let Parse::Complete(frame) = try_parse(&buf) {
                assert_eq!(sum(frame.as_bytes()), 0xFF);
                assert_eq!(frame.as_bytes().len(), frame.declared_len() as usize);
            }
            let _ = try_parse_sync_reply(&buf);
        }
    }
}
