//! High-level commands and their payloads

use crate::ProtoError;
use crate::color;
use crate::frame::{CommandId, Frame};
use crate::profile::FirmwareProfile;

pub const MAX_BRIGHTNESS_PERCENT: u8 = 100;
pub const MAX_SATURATION_PERMILLE: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Power(bool),
    Color { hue: u16, saturation_permille: u16 },
    /// Percent, 0..=100
    Brightness(u8),
    Scene(u16),
    SceneSpeed(u8),
    StatusRequest,
}

impl Command {
    /// Color command for an RGB triple; value is dropped, brightness is separate
    pub fn rgb(r: u8, g: u8, b: u8, profile: &FirmwareProfile) -> Self {
        let (h, s, _v) = color::rgb_to_hsv(r, g, b);
        Command::Color {
            hue: (profile.hue)(h),
            saturation_permille: color::saturation_permille(s),
        }
    }

    pub fn brightness(percent: i64) -> Result<Self, ProtoError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= MAX_BRIGHTNESS_PERCENT)
            .map(Command::Brightness)
            .ok_or_else(|| {
                ProtoError::InvalidArgument(format!("brightness {percent} is outside 0..=100"))
            })
    }

    pub fn scene(name_or_index: &str, profile: &FirmwareProfile) -> Result<Self, ProtoError> {
        profile.scenes.resolve(name_or_index).map(Command::Scene)
    }

    pub fn scene_speed(speed: i64) -> Result<Self, ProtoError> {
        u8::try_from(speed)
            .map(Command::SceneSpeed)
            .map_err(|_| {
                ProtoError::InvalidArgument(format!("scene speed {speed} is outside 0..=255"))
            })
    }

    pub fn id(&self) -> CommandId {
        match self {
            Command::Power(_) => CommandId::Power,
            Command::Color { .. } => CommandId::Color,
            Command::Brightness(_) => CommandId::Brightness,
            Command::Scene(_) => CommandId::Scene,
            Command::SceneSpeed(_) => CommandId::SceneSpeed,
            Command::StatusRequest => CommandId::Status,
        }
    }

    pub fn payload(&self, profile: &FirmwareProfile) -> Result<Vec<u8>, ProtoError> {
        let payload = match *self {
            Command::Power(on) => vec![on as u8],
            Command::Color {
                hue,
                saturation_permille,
            } => {
                if saturation_permille > MAX_SATURATION_PERMILLE {
                    return Err(ProtoError::InvalidArgument(format!(
                        "saturation {saturation_permille} is outside 0..=1000 permille"
                    )));
                }
                let mut buf = Vec::with_capacity(4);
                buf.extend_from_slice(&hue.to_be_bytes());
                buf.extend_from_slice(&saturation_permille.to_be_bytes());
                buf
            }
            Command::Brightness(percent) => {
                if percent > MAX_BRIGHTNESS_PERCENT {
                    return Err(ProtoError::InvalidArgument(format!(
                        "brightness {percent} is outside 0..=100"
                    )));
                }
                (profile.brightness_to_wire)(percent).to_be_bytes().to_vec()
            }
            Command::Scene(index) => index.to_be_bytes().to_vec(),
            Command::SceneSpeed(speed) => vec![speed],
            Command::StatusRequest => Vec::new(),
        };
        Ok(payload)
    }

    pub fn to_frame(&self, profile: &FirmwareProfile) -> Result<Frame, ProtoError> {
        Frame::new(self.id(), &self.payload(profile)?)
    }

    /// Frame bytes ready for the write characteristic
    pub fn encode(&self, profile: &FirmwareProfile) -> Result<Vec<u8>, ProtoError> {
        self.to_frame(profile).map(Frame::into_bytes)
    }
}
