/// Maps a pair of opposing key states onto a single axis in `{-1, 0, 1}`
pub fn key_axis(positive: bool, negative: bool) -> f64 {
    (positive as u8 as f64) - (negative as u8 as f64)
}

/// Constrain a value to `[-limit, limit]`
pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    value.clamp(-limit.abs(), limit.abs())
}

/// True for finite values strictly greater than zero
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
