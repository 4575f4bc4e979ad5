//! The Krichevski-Trofimov estimator update multiplier, in log space.
//!
//! Observing a symbol in a context where it has been seen `count` times out
//! of `visits` total multiplies the KT block probability by
//! `(count + 0.5) / (visits + 1)`. The log of this factor is precomputed for
//! every pair with `visits < 256`; larger contexts fall back to direct
//! computation.

use once_cell::sync::Lazy;

const KT_CACHE_SIZE: usize = 256;

static KT_LOG_MUL_CACHE: Lazy<Vec<f64>> = Lazy::new(|| {
    let mut cache = vec![0.0; KT_CACHE_SIZE * KT_CACHE_SIZE];
    for count in 0..KT_CACHE_SIZE {
        for visits in 0..KT_CACHE_SIZE {
            cache[count * KT_CACHE_SIZE + visits] =
                ((count as f64 + 0.5) / (visits as f64 + 1.0)).ln();
        }
    }
    cache
});

/// log of the KT update multiplier for a symbol seen `count` times in a
/// context visited `visits` times.
///
/// Requires `count <= visits`; the cache is keyed on that invariant.
#[inline]
pub fn log_kt_multiplier(count: u64, visits: u64) -> f64 {
    if visits < KT_CACHE_SIZE as u64 {
        KT_LOG_MUL_CACHE[count as usize * KT_CACHE_SIZE + visits as usize]
    } else {
        ((count as f64 + 0.5) / (visits as f64 + 1.0)).ln()
    }
}
