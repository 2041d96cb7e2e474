pub const MAX_VOLUME: u8 = 100;
pub const DEFAULT_MASTER_VOLUME: u8 = 50;
pub const DEFAULT_TRACK_VOLUME: u8 = 50;

pub fn clamp(volume: u8) -> u8 {
    volume.min(MAX_VOLUME)
}

/// Volume actually sent to the audio device, derived from individual and
/// master volume with integer rounding: `round(individual * master / 100)`.
pub fn effective(individual: u8, master: u8) -> u8 {
    let i = clamp(individual) as u16;
    let m = clamp(master) as u16;
    ((i * m + 50) / 100) as u8
}

/// Translate a 0-100 effective volume into the primitive's 0.0-1.0 domain.
pub fn gain(effective: u8) -> f32 {
    clamp(effective) as f32 / 100.0
}
