//! BLE GATT constants for Hexagon Light (MeRGBW / Fivemi) lamps
//!
//! The lamp exposes one vendor service with a write characteristic for
//! command frames and a notify characteristic for sync replies.

/// Control Service UUID: 0000fff0-0000-1000-8000-00805f9b34fb
pub const SERVICE_UUID: &str = "0000fff0-0000-1000-8000-00805f9b34fb";

/// Command Characteristic UUID (write / write-without-response)
pub const WRITE_UUID: &str = "0000fff3-0000-1000-8000-00805f9b34fb";

/// Sync Characteristic UUID (notify)
pub const NOTIFY_UUID: &str = "0000fff4-0000-1000-8000-00805f9b34fb";

/// Command codes carried in byte 1 of every frame
pub mod commands {
    /// Request sync/status - no payload, the lamp answers on the notify characteristic
    pub const STATUS: u8 = 0x00;

    /// Power - 1 byte, 0x00 off / 0x01 on
    pub const POWER: u8 = 0x01;

    /// Color - hue u16 BE followed by saturation in permille u16 BE
    pub const COLOR: u8 = 0x03;

    /// Brightness - u16 BE, see `profile::brightness_to_wire`
    pub const BRIGHTNESS: u8 = 0x05;

    /// Built-in scene - scene index u16 BE
    pub const SCENE: u8 = 0x06;

    /// Scene speed - 1 byte
    pub const SCENE_SPEED: u8 = 0x0f;
}
