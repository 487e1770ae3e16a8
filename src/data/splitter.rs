// ============================================================
// Layer 4 - Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into two
// sets:
//   - Training set:   used to update model weights
//   - Validation set: used for early stopping and evaluation
//
// The validation set takes ceil(test_fraction * n) samples, the
// training set gets the rest. The same seed always yields the
// same split, so runs are reproducible.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Fraction of rows held out for validation.
pub const TEST_FRACTION: f64 = 0.2;

/// Seed for the split and for batch shuffling.
pub const SPLIT_SEED: u64 = 42;

/// Shuffle `samples` with `seed` and split into (train, validation).
pub fn split_train_val<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total  = samples.len();
    let n_test = ((total as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(total);

    // After this: samples = training rows, val = held-out rows
    let train = samples.split_off(n_test);
    let val   = samples;

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        train.len(),
        val.len(),
    );

    (train, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val) = split_train_val(items, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(), 20);
    }

    #[test]
    fn test_validation_size_rounds_up() {
        let items: Vec<usize> = (0..11).collect();
        let (train, val) = split_train_val(items, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(val.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (mut train, val) = split_train_val(items, 0.3, SPLIT_SEED);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..40).collect::<Vec<usize>>(), TEST_FRACTION, SPLIT_SEED);
        let b = split_train_val((0..40).collect::<Vec<usize>>(), TEST_FRACTION, SPLIT_SEED);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, val) = split_train_val(Vec::<usize>::new(), TEST_FRACTION, SPLIT_SEED);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }
}
