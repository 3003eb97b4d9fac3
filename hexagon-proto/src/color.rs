//! RGB to the lamp's hue/saturation representation

/// Maps a hue in degrees `[0, 360)` to the firmware's hue units
pub type HueConversion = fn(f64) -> u16;

/// Whole degrees, 0..=359
pub fn hue_degrees(degrees: f64) -> u16 {
    (degrees.round() as u16) % 360
}

/// Degrees spread over the full u16 range
pub fn hue_u16_scaled(degrees: f64) -> u16 {
    (degrees * (65535.0 / 360.0)).round().clamp(0.0, 65535.0) as u16
}

/// Saturation `[0, 1]` as permille
pub fn saturation_permille(saturation: f64) -> u16 {
    (saturation * 1000.0).round().clamp(0.0, 1000.0) as u16
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, max);
    }

    let saturation = delta / max;
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    ((sector * 60.0) % 360.0, saturation, max)
}
