//! Tolerance constants for pipeline tests.

/// Floating point rounding errors (pass-through, unity tempo).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// 16-bit quantization step size.
/// Use when comparing samples that went through a PCM16 WAV fixture.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;
