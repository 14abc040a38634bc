// File: src/core/sampler.rs
use rand::Rng;

/// Picks one of `options` with probability proportional to its weight.
///
/// Builds the running sum of `weights` in one pass, draws `r` uniformly from
/// `[0, total)` and binary-searches for the first cumulative value strictly
/// greater than `r`. Equal cumulative values resolve to the earlier index.
///
/// Returns `None` when the slices are empty, differ in length, or the total
/// weight is not a positive finite number. Callers are expected to drop
/// non-positive weights first.
pub fn weighted_choice<'a, T, R>(options: &'a [T], weights: &[f64], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if options.is_empty() || options.len() != weights.len() {
        return None;
    }

    let mut running = 0.0;
    let cumulative: Vec<f64> = weights
        .iter()
        .map(|&w| {
            running += w;
            running
        })
        .collect();

    let total = running;
    if !(total.is_finite() && total > 0.0) {
        return None;
    }

    let r = rng.gen_range(0.0..total);
    let idx = cumulative.partition_point(|&c| c <= r);

    // Float rounding can leave r at the very top of the range.
    options.get(idx.min(options.len() - 1))
}
