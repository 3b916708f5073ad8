use rand::{seq::SliceRandom, Rng};

use crate::error::{DatasetError, DatasetResult};

/// Shuffle `items` and split them into training and validation subsets.
///
/// The training subset receives `floor(len * train_fraction)` items. With two or
/// more items both subsets are kept non-empty.
pub fn split_train_validation<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    train_fraction: f64,
    rng: &mut R,
) -> DatasetResult<(Vec<T>, Vec<T>)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(DatasetError::InvalidTrainFraction {
            fraction: train_fraction,
        });
    }

    items.shuffle(rng);

    let len = items.len();
    let mut train_len = (len as f64 * train_fraction).floor() as usize;
    if len >= 2 {
        train_len = train_len.clamp(1, len - 1);
    }

    let validation = items.split_off(train_len);
    Ok((items, validation))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn eighty_twenty_split_is_disjoint_and_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let (train, valid) = split_train_validation((0..10).collect::<Vec<i32>>(), 0.8, &mut rng).unwrap();

        assert_eq!(train.len(), 8);
        assert_eq!(valid.len(), 2);

        let all: HashSet<i32> = train.iter().chain(&valid).copied().collect();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn same_seed_gives_same_split() {
        let split = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            split_train_validation((0..50).collect::<Vec<_>>(), 0.8, &mut rng).unwrap()
        };
        assert_eq!(split(3), split(3));
    }

    #[test]
    fn tiny_sets_keep_both_subsets() {
        let mut rng = StdRng::seed_from_u64(0);
        let (train, valid) = split_train_validation(vec!['a', 'b'], 0.8, &mut rng).unwrap();
        assert_eq!((train.len(), valid.len()), (1, 1));
    }

    #[test]
    fn fraction_must_be_a_proper_ratio() {
        let mut rng = StdRng::seed_from_u64(0);
        for fraction in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                split_train_validation(vec![1, 2, 3], fraction, &mut rng),
                Err(DatasetError::InvalidTrainFraction { .. })
            ));
        }
    }
}
