use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Linear interpolation of `value` from `[domain_min, domain_max]` onto
/// `[range_min, range_max]`.
///
/// A degenerate domain (`domain_min == domain_max`) maps everything to
/// `range_min`.
#[must_use]
pub fn map_range(value: f64, domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> f64 {
    let span = domain_max - domain_min;
    if span == 0.0 || !span.is_finite() {
        return range_min;
    }
    let normalized = (value - domain_min) / span;
    range_min + normalized * (range_max - range_min)
}

/// Magnitude to bubble radius mapping for one render.
///
/// Built from the observed extent of the current dataset and never reused
/// across datasets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusScale {
    domain_min: f64,
    domain_max: f64,
    min_radius: f64,
    max_radius: f64,
}

impl RadiusScale {
    #[must_use]
    pub fn new(domain_min: f64, domain_max: f64, min_radius: f64, max_radius: f64) -> Self {
        Self {
            domain_min,
            domain_max,
            min_radius,
            max_radius,
        }
    }

    /// Uses the min/max of `magnitudes`; an empty input yields a `[0, 0]` domain.
    #[must_use]
    pub fn from_magnitudes(
        magnitudes: impl IntoIterator<Item = f64>,
        min_radius: f64,
        max_radius: f64,
    ) -> Self {
        let extent = magnitudes
            .into_iter()
            .map(OrderedFloat)
            .fold(None, |extent, value| match extent {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            });
        let (lo, hi) = extent.map_or((0.0, 0.0), |(lo, hi)| (lo.0, hi.0));
        Self::new(lo, hi, min_radius, max_radius)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.min_radius, self.max_radius)
    }

    /// Radius for `magnitude`, clamped to the configured radius bounds.
    #[must_use]
    pub fn radius(self, magnitude: f64) -> f64 {
        let radius = map_range(
            magnitude,
            self.domain_min,
            self.domain_max,
            self.min_radius,
            self.max_radius,
        );
        let lo = self.min_radius.min(self.max_radius);
        let hi = self.min_radius.max(self.max_radius);
        radius.max(lo).min(hi)
    }
}
