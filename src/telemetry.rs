//! Tracing setup and log-safe fingerprints.
//!
//! Clinical inputs never appear in logs; events carry a short SHA-256
//! fingerprint of the serialized input instead, enough to correlate the
//! stages of one evaluation.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "CADENCE_DEV_LOG";
pub const ENV_LOG_FORMAT: &str = "CADENCE_LOG_FORMAT";
pub const DEFAULT_FILTER: &str = "cadence=info,warn";

static INIT: OnceCell<bool> = OnceCell::new();

/// Dev logging gate: CADENCE_DEV_LOG=1, or any debug build.
pub fn dev_logging_enabled() -> bool {
    cfg!(debug_assertions) || std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1")
}

/// Install a fmt subscriber filtered by `RUST_LOG` (falls back to
/// `cadence=info,warn`). Compact lines by default, JSON lines with
/// `CADENCE_LOG_FORMAT=json`. Safe to call repeatedly; returns whether a
/// subscriber is active after the call.
pub fn init_tracing() -> bool {
    *INIT.get_or_init(|| {
        if !dev_logging_enabled() {
            return false;
        }
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let registry = tracing_subscriber::registry().with(filter);
        if std::env::var(ENV_LOG_FORMAT).ok().as_deref() == Some("json") {
            registry.with(fmt::layer().json()).try_init().is_ok()
        } else {
            registry.with(fmt::layer().compact()).try_init().is_ok()
        }
    })
}

/// First 6 bytes of SHA-256 over the JSON form of `value`, hex encoded.
pub fn fingerprint<T: Serialize>(value: &T) -> String {
    use sha2::{Digest, Sha256};
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{PatientProfile, Sex, SymptomCategory};

    #[test]
    fn fingerprint_is_short_and_stable() {
        let p = PatientProfile::default();
        let a = fingerprint(&p);
        assert_eq!(a.len(), 12);
        assert_eq!(a, fingerprint(&p));

        let q = PatientProfile::new(56, Sex::Male, SymptomCategory::Typical);
        assert_ne!(a, fingerprint(&q));
    }

    #[test]
    fn init_is_idempotent() {
        let first = init_tracing();
        assert_eq!(first, init_tracing());
    }
}
