// shared histograms for optimizer tests

use crate::fitness::{FuzzyEntropyObjective, Histogram, NUM_BINS};

/// gaussian counts centred at 42, 128 and 212 (σ = 10)
pub(crate) fn three_modes() -> Histogram {
    let counts: Vec<f64> = (0..NUM_BINS)
        .map(|b| {
            let x = b as f64;
            [42.0, 128.0, 212.0]
                .iter()
                .map(|&m: &f64| 1000.0 * (-(x - m).powi(2) / (2.0 * 100.0)).exp())
                .sum()
        })
        .collect();
    Histogram::new(&counts).expect("finite non-negative counts")
}

/// uniform mass over [0, 85) and [170, 256) with an empty valley between
pub(crate) fn two_blocks() -> Histogram {
    let counts: Vec<f64> = (0..NUM_BINS)
        .map(|b| if b < 85 || b >= 170 { 1.0 } else { 0.0 })
        .collect();
    Histogram::new(&counts).expect("finite non-negative counts")
}

pub(crate) fn two_modes_objective(k: usize) -> FuzzyEntropyObjective {
    FuzzyEntropyObjective::with_default_steepness(&two_blocks(), k).expect("valid k")
}
