//! Reassembly of notification fragments into frames

use crate::frame::{self, Frame, HEADER_SYNC, Header, Invalid, MAX_FRAME_LEN, Parse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    Frame(Frame),
    /// Waiting for more fragments
    Pending,
    /// Buffered bytes were dropped
    Discarded(Invalid),
}

#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: Vec<u8>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Assembled {
        let open_sync_reply = self.buf.first() == Some(&HEADER_SYNC);
        self.buf.extend_from_slice(chunk);

        match self.assemble() {
            // An unfinished sync reply is abandoned once a new frame begins
            Assembled::Pending if open_sync_reply && starts_frame(chunk) => {
                self.buf.clear();
                self.buf.extend_from_slice(chunk);
                self.assemble()
            }
            assembled => assembled,
        }
    }

    fn assemble(&mut self) -> Assembled {
        let parsed = match frame::try_parse(&self.buf) {
            Parse::Invalid(Invalid::Length { .. } | Invalid::Checksum { .. })
                if self.buf.first() == Some(&HEADER_SYNC) =>
            {
                // Sync replies carry no usable length, so an unbalanced
                // buffer may still be waiting for its tail
                match frame::try_parse_sync_reply(&self.buf) {
                    Parse::Invalid(Invalid::Checksum { .. }) if self.buf.len() < MAX_FRAME_LEN => {
                        Parse::Incomplete
                    }
                    parsed => parsed,
                }
            }
            parsed => parsed,
        };

        match parsed {
            Parse::Complete(frame) => {
                self.buf.clear();
                Assembled::Frame(frame)
            }
            Parse::Incomplete => Assembled::Pending,
            Parse::Invalid(reason) => {
                self.buf.clear();
                Assembled::Discarded(reason)
            }
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

fn starts_frame(chunk: &[u8]) -> bool {
    chunk.first().is_some_and(|b| Header::from_byte(*b).is_some())
}
