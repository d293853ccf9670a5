//! Splitting of an outer step against the fastest loss timescale.
//!
//! A step is divided into `k` equal pieces so that each piece satisfies
//!
//! ```text
//! Δt / k ≤ safety_ratio × min(t_blow, t_coll)
//! ```
//!
//! `k` is capped at `max_split`; hitting the cap is logged and the step
//! proceeds with the capped count, leaving accuracy to the mass-budget guard.

use units::Time;

/// Number of equal pieces for a step of `dt`.
pub fn split_count(dt: Time, limits: &[Option<Time>], safety_ratio: f64, max_split: usize) -> usize {
    let dt = dt.to_seconds();
    let fastest = limits
        .iter()
        .flatten()
        .map(|t| t.to_seconds())
        .filter(|t| t.is_finite() && *t > 0.0)
        .reduce(f64::min);
    let Some(t_min) = fastest else {
        return 1;
    };
    let allowed = safety_ratio * t_min;
    if !(dt > allowed) {
        return 1;
    }
    let needed = (dt / allowed).ceil();
    let cap = max_split.max(1);
    if needed > cap as f64 {
        log::warn!(
            "step of {dt:.3e} s needs {needed:.0} pieces against t_min = {t_min:.3e} s; capped at {cap}"
        );
        return cap;
    }
    needed as usize
}
