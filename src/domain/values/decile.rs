//! Quantile binning.
//!
//! Values are split into `bins` groups of roughly equal size using linearly
//! interpolated quantiles as bin edges. Bins are right-closed with the lowest
//! edge included, so the smallest value always lands in bin 0.
//!
//! Skewed or tied data can produce repeated edges. Repeated edges are dropped,
//! which yields fewer bins than requested; this is never an error. When every
//! value is identical there is a single bin and every value is assigned 0.

/// Number of bins used for dispersion deciles.
pub const DECILES: usize = 10;

/// Assign each value its quantile bin index, preserving input order.
pub fn quantile_bins(values: &[f64], bins: usize) -> Vec<usize> {
    if values.is_empty() || bins == 0 {
        return vec![0; values.len()];
    }

    let edges = bin_edges(values, bins);
    if edges.len() < 2 {
        return vec![0; values.len()];
    }

    values.iter().map(|v| bin_index(*v, &edges)).collect()
}

/// Unique, ascending quantile edges (`bins + 1` before deduplication).
pub fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| quantile(&sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Linear-interpolated quantile of already sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn bin_index(value: f64, edges: &[f64]) -> usize {
    let last = edges.len() - 2;
    edges[1..]
        .iter()
        .position(|upper| value <= *upper)
        .unwrap_or(last)
        .min(last)
}
