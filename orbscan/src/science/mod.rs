//! Science yield from map coverage.
//!
//! Converts the coverage a body's map has reached into the data value an
//! experiment is worth, after what was already collected for the same
//! subject.
//!
//! # Yield
//!
//! ```text
//! fraction:  c >= 95% -> 1,  c < 30% -> 0,  otherwise c / 100
//! remaining: max(0, fraction * cap - collected)
//! yield:     remaining / max(0.1, scientific_value) / subject_value
//! ```
//!
//! Subject metadata (caps, multipliers) belongs to the host; it is handed in
//! through a [`SubjectCatalog`].

mod experiment;

pub use experiment::{select_experiment, Experiment};

use crate::ephemeris::Body;

/// Coverage (percent) at and above which a map counts as complete.
pub const FULL_COVERAGE_PERCENT: f64 = 95.0;

/// Coverage (percent) below which a map is worth nothing.
pub const MIN_COVERAGE_PERCENT: f64 = 30.0;

/// Floor for the scientific value divisor.
pub const MIN_SCIENTIFIC_VALUE: f64 = 0.1;

/// Yield reported instead of zero when a non-zero result is requested.
pub const NEVER_ZERO_YIELD: f64 = 1e-5;

/// Host metadata for one experiment on one body.
#[derive(Debug, Clone, PartialEq)]
pub struct ScienceSubject {
    /// Host identifier of the subject.
    pub id: String,
    /// Total science the subject can ever yield.
    pub science_cap: f64,
    /// Diminishing-returns multiplier. Mapping data never diminishes, so
    /// the yield treats this as 1.
    pub scientific_value: f64,
    /// Per-body value multiplier.
    pub subject_value: f64,
    /// Science already collected for this subject.
    pub collected: f64,
}

/// Looks up subject metadata for an experiment on a body.
pub trait SubjectCatalog {
    /// The subject for `experiment` on `body`, if the host knows one.
    fn subject(&self, experiment: Experiment, body: &Body) -> Option<ScienceSubject>;
}

impl<F> SubjectCatalog for F
where
    F: Fn(Experiment, &Body) -> Option<ScienceSubject>,
{
    fn subject(&self, experiment: Experiment, body: &Body) -> Option<ScienceSubject> {
        self(experiment, body)
    }
}

/// Science that could be transmitted for a body right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ScienceOffer {
    /// Experiment the offer is for.
    pub experiment: Experiment,
    /// Host subject identifier.
    pub subject_id: String,
    /// Human-readable title, e.g. "Biome survey of Kerbin".
    pub title: String,
    /// Coverage the yield was computed from (percent).
    pub coverage: f64,
    /// Data value.
    pub value: f64,
}

/// Fraction of the science cap unlocked at `coverage` percent.
pub fn coverage_fraction(coverage: f64) -> f64 {
    if coverage >= FULL_COVERAGE_PERCENT {
        1.0
    } else if coverage < MIN_COVERAGE_PERCENT || coverage.is_nan() {
        0.0
    } else {
        coverage / 100.0
    }
}

/// Data value of a subject at `coverage` percent.
///
/// Never negative. With `never_zero`, a non-positive result is replaced by
/// [`NEVER_ZERO_YIELD`] so the host still has something to transmit. A
/// subject with no positive value yields nothing.
pub fn science_yield(coverage: f64, subject: &ScienceSubject, never_zero: bool) -> f64 {
    let fraction = coverage_fraction(coverage);
    let remaining = (fraction * subject.science_cap - subject.collected).max(0.0);

    let scientific_value: f64 = 1.0;
    let value = if subject.subject_value > 0.0 {
        remaining / scientific_value.max(MIN_SCIENTIFIC_VALUE) / subject.subject_value
    } else {
        0.0
    };

    tracing::debug!(
        subject = %subject.id,
        coverage,
        cap = subject.science_cap,
        collected = subject.collected,
        remaining,
        value,
        "Computed science yield"
    );

    if never_zero && value <= 0.0 {
        NEVER_ZERO_YIELD
    } else {
        value
    }
}
