//! Firmware dialects
//!
//! Everything that differs between firmware builds of the same lamp family
//! lives here, so the frame codec stays untouched when a new variant shows up.

use crate::color::{self, HueConversion};
use crate::scene::{SceneRegistry, TG609_SCENES};

#[derive(Debug, Clone, Copy)]
pub struct FirmwareProfile {
    pub name: &'static str,
    pub scenes: SceneRegistry,
    pub hue: HueConversion,
    /// Percent (0..=100) to the brightness wire value
    pub brightness_to_wire: fn(u8) -> u16,
    /// Wire value back to percent, `None` when it does not map into 0..=100
    pub brightness_from_wire: fn(u16) -> Option<u8>,
}

pub const TG609: FirmwareProfile = FirmwareProfile {
    name: "tg609",
    scenes: SceneRegistry::new(TG609_SCENES),
    hue: color::hue_degrees,
    brightness_to_wire,
    brightness_from_wire,
};

impl Default for FirmwareProfile {
    fn default() -> Self {
        TG609
    }
}

/// The vendor app sends `(percent + 5) * 10`; this is not a percentage on the wire
pub fn brightness_to_wire(percent: u8) -> u16 {
    (percent as u16 + 5) * 10
}

pub fn brightness_from_wire(value: u16) -> Option<u8> {
    let percent = (value / 10).checked_sub(5)?;
    u8::try_from(percent).ok().filter(|p| *p <= 100)
}
