use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance for comparing summed FTE values against a capacity limit.
///
/// Summing fractions such as 0.1 + 0.2 + 0.7 drifts by one ulp; anything
/// inside this band counts as equal.
pub const FTE_EPSILON: f64 = 1e-9;

/// A full-time-equivalent share, stored as a fraction (1.0 = one full person).
///
/// The fraction is the only stored representation. The legacy percentage
/// form exists on the wire (`allocationPercentage`) and for display, and is
/// always derived from the fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fte(f64);

impl Fte {
    pub const ZERO: Fte = Fte(0.0);
    pub const FULL: Fte = Fte(1.0);

    pub fn new(fraction: f64) -> Self {
        Self(fraction)
    }

    /// Converts a legacy percentage (50 = half time) into a fraction.
    pub fn from_percentage(percentage: f64) -> Self {
        Self(percentage / 100.0)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    /// Percentage form rounded to two decimals, for the wire and for display.
    pub fn percentage(self) -> f64 {
        round2(self.0 * 100.0)
    }

    /// Whether this value is usable on a single allocation: in (0, 1].
    pub fn is_valid_allocation(self) -> bool {
        self.0 > 0.0 && self.0 <= 1.0 + FTE_EPSILON
    }

    pub fn is_zero(self) -> bool {
        self.0.abs() <= FTE_EPSILON
    }

    /// `self > other`, ignoring summation noise.
    pub fn exceeds(self, other: Fte) -> bool {
        self.0 - other.0 > FTE_EPSILON
    }

    /// Non-negative difference, `max(0, self - other)`.
    pub fn saturating_sub(self, other: Fte) -> Fte {
        Fte((self.0 - other.0).max(0.0))
    }
}

impl Add for Fte {
    type Output = Fte;

    fn add(self, rhs: Fte) -> Fte {
        Fte(self.0 + rhs.0)
    }
}

impl Sub for Fte {
    type Output = Fte;

    fn sub(self, rhs: Fte) -> Fte {
        Fte(self.0 - rhs.0)
    }
}

impl Sum for Fte {
    fn sum<I: Iterator<Item = Fte>>(iter: I) -> Fte {
        iter.fold(Fte::ZERO, |acc, f| acc + f)
    }
}

impl<'a> Sum<&'a Fte> for Fte {
    fn sum<I: Iterator<Item = &'a Fte>>(iter: I) -> Fte {
        iter.copied().sum()
    }
}

impl fmt::Display for Fte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Both FTE representations as they appear in JSON payloads.
///
/// Servers may send either field; the fraction wins when both are present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FteFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_percentage: Option<f64>,
}

impl FteFields {
    pub fn resolve(self) -> Option<Fte> {
        match (self.fte, self.allocation_percentage) {
            (Some(fraction), _) => Some(Fte::new(fraction)),
            (None, Some(percentage)) => Some(Fte::from_percentage(percentage)),
            (None, None) => None,
        }
    }
}

impl From<Fte> for FteFields {
    fn from(fte: Fte) -> Self {
        Self {
            fte: Some(fte.fraction()),
            allocation_percentage: Some(fte.percentage()),
        }
    }
}

impl From<Option<Fte>> for FteFields {
    fn from(fte: Option<Fte>) -> Self {
        fte.map(Into::into).unwrap_or_default()
    }
}
