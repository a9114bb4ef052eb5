// Sensitivity utilities
// Sensitivity scales pattern weights in the heuristic scorer; it never touches the blend.

use serde::{Deserialize, Serialize};

pub const MIN_SENSITIVITY: u8 = 1;
pub const MAX_SENSITIVITY: u8 = 10;
pub const DEFAULT_SENSITIVITY: u8 = 5;

/// Sensitivity level on a 1..=10 scale. Level 5 leaves weights untouched.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Sensitivity(u8);

impl Sensitivity {
    pub fn new(level: u8) -> Self {
        Self(level.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY))
    }

    /// Accepts "low" / "medium" / "high" or a number; anything else is the default.
    pub fn from_str(val: &str) -> Self {
        let val = val.trim().to_lowercase();
        match val.as_str() {
            "low" => Self::new(3),
            "medium" => Self::new(DEFAULT_SENSITIVITY),
            "high" => Self::new(8),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| Self::new(v.round().clamp(0.0, 255.0) as u8))
                .unwrap_or_default(),
        }
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// Weight multiplier: 0.6 at level 1, 1.0 at level 5, 1.5 at level 10.
    pub fn multiplier(&self) -> f64 {
        0.5 + 0.1 * self.0 as f64
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(DEFAULT_SENSITIVITY)
    }
}

impl From<u8> for Sensitivity {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<Sensitivity> for u8 {
    fn from(s: Sensitivity) -> Self {
        s.0
    }
}
