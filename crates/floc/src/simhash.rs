//! SimHash over weighted 64-bit features.
//!
//! Each output dimension `d` is a random hyperplane whose coordinate for
//! feature `f` is a standard Gaussian derived from `(d, f)`. The coordinate is
//! recomputed from CityHash on demand, so no projection matrix is stored and
//! any feature universe works. Bit `d` is set when the weighted sum for that
//! hyperplane is strictly positive.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rayon::prelude::*;

use crate::cityhash::{city_hash64, city_hash64_with_seed};
use crate::config::MAX_SIM_HASH_BITS;

/// Feature hash → weight. Ordered so float accumulation is reproducible.
pub type WeightedFeatures = BTreeMap<u64, f64>;

/// Uniform value in `[0, 1]` keyed by `(i, j, seed)`.
#[inline]
pub fn random_uniform(i: u64, j: u64, seed: u64) -> f64 {
    let mut pair = [0u8; 16];
    pair[..8].copy_from_slice(&i.to_le_bytes());
    pair[8..].copy_from_slice(&j.to_le_bytes());
    city_hash64_with_seed(&pair, seed) as f64 / u64::MAX as f64
}

/// Standard Gaussian keyed by `(i, j)` via the Box-Muller transform.
#[inline]
pub fn random_gaussian(i: u64, j: u64) -> f64 {
    let rv1 = random_uniform(i, j, 1);
    let rv2 = random_uniform(j, i, 2);
    (-2.0 * rv1.ln()).sqrt() * (2.0 * PI * rv2).cos()
}

/// Sum of `gaussian(dimension, feature) * weight` across all features.
#[inline]
fn project(features: &WeightedFeatures, dimension: u64) -> f64 {
    features
        .iter()
        .map(|(&feature, &weight)| random_gaussian(dimension, feature) * weight)
        .sum()
}

/// Compute a `dims`-bit sim hash from weighted features.
///
/// `dims` above 64 is treated as 64. Parallel and sequential paths project
/// each dimension in the same feature order and agree bit for bit.
pub fn sim_hash_bits(features: &WeightedFeatures, dims: u8, use_parallel: bool) -> u64 {
    let dims = dims.min(MAX_SIM_HASH_BITS);
    if dims == 0 || features.is_empty() {
        return 0;
    }

    let positive: Vec<bool> = if use_parallel {
        (0..u64::from(dims))
            .into_par_iter()
            .map(|d| project(features, d) > 0.0)
            .collect()
    } else {
        (0..u64::from(dims))
            .map(|d| project(features, d) > 0.0)
            .collect()
    };

    let mut result = 0u64;
    for (d, &set) in positive.iter().enumerate() {
        if set {
            result |= 1u64 << d;
        }
    }
    result
}

/// Hash every string to a feature of weight 1 and sim-hash the set.
///
/// Repeated strings count once.
pub fn sim_hash_strings<S>(input: &[S], dims: u8, use_parallel: bool) -> u64
where
    S: AsRef<str>,
{
    let features: WeightedFeatures = input
        .iter()
        .map(|s| (city_hash64(s.as_ref().as_bytes()), 1.0))
        .collect();
    sim_hash_bits(&features, dims, use_parallel)
}
