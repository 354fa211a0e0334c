/// Default number of positions of the headphone volume device.
pub const HEADPHONE_VOLUME_STEPS: u8 = 16;

/// Highest headphone volume step.
pub const HEADPHONE_VOLUME_MAX: u8 = HEADPHONE_VOLUME_STEPS - 1;

/// Headphone volume step that corresponds to 0 dB.
pub const HEADPHONE_VOLUME_UNITY_STEP: u8 = 11;

/// Headphone volume step size in centi-dB (3 dB).
pub const HEADPHONE_VOLUME_STEP_CDB: i32 = 300;

/// Number of selectable input gain stages per channel.
pub const GAIN_STAGES: u8 = 4;

/// Gain of each input gain stage in centi-dB.
pub const GAIN_STAGE_CDB: [i32; GAIN_STAGES as usize] = [0, 600, 1500, 2040];

/// Resolution of the register-mapped volume and gain trims in centi-dB.
pub const TRIM_STEP_CDB: i32 = 50;

/// Time the reset line is held low before release, in milliseconds.
pub const RESET_HOLD_MS: u32 = 1;
