//! Probability models, leaves first:
//! 1) `rf_cl`: risk-factor-weighted clinical likelihood (logistic)
//! 2) `cacs_cl`: calcium-score-weighted clinical likelihood (linear blend)
//! 3) `post_test`: likelihood-ratio adjustment for completed test results
//!
//! Every function is total and returns a percentage in `[0, 100]`.

pub mod cacs_cl;
pub mod rf_cl;

pub use cacs_cl::{compute_cacs_cl, CacsBin, CalcificationGrade};
pub use post_test::{adjust_for_test_results, odds_from_percent, percent_from_odds};
pub use rf_cl::{compute_rf_cl, rf_cl_logit};

/// Clamp a percentage into `[0, 100]`; NaN collapses to 0.
pub(crate) fn clamp_percent(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 100.0)
    }
}
