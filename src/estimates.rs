// Duration and cost estimates derived from upload size

/// Bytes per megabyte used by the size heuristic
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Assumed audio density, in megabytes per minute
const MB_PER_MINUTE: f64 = 0.5;

/// Floor for the duration estimate, in minutes
const MIN_ESTIMATED_MINUTES: f64 = 0.1;

/// Price per minute of audio, in dollars
pub const COST_PER_MINUTE: f64 = 0.003;

/// Estimated audio length in minutes for an upload of `size_bytes`
pub fn estimate_minutes(size_bytes: usize) -> f64 {
    let size_mb = size_bytes as f64 / BYTES_PER_MB;
    (size_mb / MB_PER_MINUTE).max(MIN_ESTIMATED_MINUTES)
}

/// Estimated cost for `minutes` of audio
pub fn estimate_cost(minutes: f64) -> f64 {
    minutes * COST_PER_MINUTE
}

/// Rounds `value` to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Reported estimates for one upload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Minutes, rounded to 2 decimals
    pub minutes: f64,
    /// Dollars, rounded to 6 decimals
    pub cost: f64,
}

impl Estimate {
    /// Cost is computed from the unrounded duration
    pub fn for_size(size_bytes: usize) -> Self {
        let minutes = estimate_minutes(size_bytes);
        Self {
            minutes: round_to(minutes, 2),
            cost: round_to(estimate_cost(minutes), 6),
        }
    }
}
