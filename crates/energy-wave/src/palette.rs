//! Fixed colors for the energy-wave visuals.

use energy_wave_core::Srgb;

/// Glow tint for positive sources (#38bdf8).
pub const POSITIVE: Srgb = Srgb {
    r: 0.219_608,
    g: 0.741_176,
    b: 0.972_549,
};

/// Glow tint for negative sources (#f59e0b).
pub const NEGATIVE: Srgb = Srgb {
    r: 0.960_784,
    g: 0.619_608,
    b: 0.043_137,
};

/// Slow particles (#7dd3fc).
pub const PARTICLE_COOL: Srgb = Srgb {
    r: 0.490_196,
    g: 0.827_451,
    b: 0.988_235,
};

/// Fast particles (#fef3c7).
pub const PARTICLE_HOT: Srgb = Srgb {
    r: 0.996_078,
    g: 0.952_941,
    b: 0.780_392,
};

/// Field-line stroke (#94a3b8).
pub const FIELD_LINE: Srgb = Srgb {
    r: 0.580_392,
    g: 0.639_216,
    b: 0.721_569,
};

/// Pointer halo (#e0f2fe).
pub const POINTER: Srgb = Srgb {
    r: 0.878_431,
    g: 0.949_020,
    b: 0.996_078,
};
