// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles items and splits them into a training set and a
// validation set. Driving logs are strongly ordered in time —
// consecutive records show near-identical stretches of road — so a
// split without shuffling would hand the validation set one
// contiguous segment of the drive.
//
// The split operates on record indices rather than materialized
// samples, so no image is loaded before training starts.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;

/// Randomly shuffle `items` and split into (train, validation).
///
/// # Arguments
/// * `items`          - All available items (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
pub fn split_train_val<T>(mut items: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();

    // Fisher-Yates — every permutation equally likely
    items.shuffle(&mut rng);

    let total = items.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them
    let val = items.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        items.len(),
        val.len(),
    );

    (items, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_follow_the_fraction() {
        let indices: Vec<usize> = (0..100).collect();
        let (train, val) = split_train_val(indices, 0.8);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(), 20);
    }

    #[test]
    fn test_no_index_is_lost_or_duplicated() {
        let indices: Vec<usize> = (0..50).collect();
        let (train, val) = split_train_val(indices, 0.7);

        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<usize>>());
    }

    #[test]
    fn test_empty_input_splits_into_empty_sets() {
        let indices: Vec<usize> = Vec::new();
        let (train, val) = split_train_val(indices, 0.8);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_full_fraction_keeps_everything_in_training() {
        let indices: Vec<usize> = (0..10).collect();
        let (train, val) = split_train_val(indices, 1.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
