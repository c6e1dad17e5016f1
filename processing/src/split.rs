use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices of a seeded train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..rows` with a fixed seed and holds out `ceil(rows * test_fraction)`.
///
/// The same `(rows, test_fraction, seed)` always yields the same split.
pub fn train_test_split(rows: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let test_len = ((rows as f64) * fraction).ceil() as usize;
    let test_len = test_len.min(rows);

    let train = indices.split_off(test_len);
    Split {
        train,
        test: indices,
    }
}
