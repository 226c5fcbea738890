/// How many neighbouring keyframes the locator scans linearly before it gives up on the
/// hint and falls back to a binary search.
pub const DEFAULT_LOCATE_WINDOW: usize = 4;

/// Find the index of the last record whose start is `<= time`.
///
/// `records` must be non-empty and strictly ascending. Times before the first record
/// map to 0 and times at or past the last record map to the last index.
///
/// `hint` is the previous answer. While scrubbing, the new answer is almost always the
/// hint or one of its neighbours, so the search walks up to `window` steps from the hint
/// in the direction of `time` and only then binary-searches the remaining side. Any hint
/// is accepted, including one left over from an unrelated timeline position.
#[allow(clippy::indexing_slicing)] // every index is bounded by the guards at the top
pub fn locate(records: &[f64], hint: usize, time: f64, window: usize) -> usize {
    let Some(last) = records.len().checked_sub(1) else {
        return 0;
    };
    if time.is_nan() || time < records[0] {
        return 0;
    }
    if time >= records[last] {
        return last;
    }

    // From here records[0] <= time < records[last], so the answer is in 0..last.
    let mut i = hint.min(last);
    if records[i] <= time {
        // Forward. Invariant: records[i] <= time, hence i < last.
        for _ in 0..window {
            if records[i + 1] > time {
                return i;
            }
            i += 1;
        }
        i + records[i..].partition_point(|&s| s <= time) - 1
    } else {
        // Backward. Invariant: records[i] > time, hence i >= 1.
        for _ in 0..window {
            i -= 1;
            if records[i] <= time {
                return i;
            }
        }
        records[..i].partition_point(|&s| s <= time) - 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::cast_precision_loss)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    /// Straightforward scan used as the oracle.
    fn reference(records: &[f64], time: f64) -> usize {
        records.iter().rposition(|&s| s <= time).unwrap_or(0)
    }

    fn random_records(rng: &mut SmallRng) -> Vec<f64> {
        let n = rng.random_range(1..60);
        let mut t = rng.random_range(0.0..3.0);
        (0..n)
            .map(|_| {
                let s = t;
                t += rng.random_range(0.01..5.0);
                s
            })
            .collect()
    }

    #[test]
    fn boundaries() {
        let records = [1.0, 2.0, 4.0];
        assert_eq!(locate(&records, 0, 0.0, DEFAULT_LOCATE_WINDOW), 0);
        assert_eq!(locate(&records, 2, 0.5, DEFAULT_LOCATE_WINDOW), 0);
        assert_eq!(locate(&records, 0, 1.0, DEFAULT_LOCATE_WINDOW), 0);
        assert_eq!(locate(&records, 0, 2.0, DEFAULT_LOCATE_WINDOW), 1);
        assert_eq!(locate(&records, 0, 3.999, DEFAULT_LOCATE_WINDOW), 1);
        assert_eq!(locate(&records, 0, 4.0, DEFAULT_LOCATE_WINDOW), 2);
        assert_eq!(locate(&records, 1, 100.0, DEFAULT_LOCATE_WINDOW), 2);
    }

    #[test]
    fn single_record_always_zero() {
        for hint in [0, 1, 50] {
            assert_eq!(locate(&[3.0], hint, 0.0, 2), 0);
            assert_eq!(locate(&[3.0], hint, 9.0, 2), 0);
        }
    }

    #[test]
    fn out_of_range_hint_is_tolerated() {
        let records = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate(&records, 1_000, 1.5, 1), 1);
        assert_eq!(locate(&records, 1_000, 2.5, 0), 2);
    }

    #[test]
    fn random_hints_match_reference() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let records = random_records(&mut rng);
            let end = records.last().copied().unwrap() + 5.0;
            for _ in 0..40 {
                let time = rng.random_range(-1.0..end);
                let hint = rng.random_range(0..records.len() + 3);
                let window = rng.random_range(0..6);
                assert_eq!(
                    locate(&records, hint, time, window),
                    reference(&records, time),
                    "records={records:?} hint={hint} time={time} window={window}"
                );
            }
        }
    }

    #[test]
    fn forward_and_backward_scrub_match_reference() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let records = random_records(&mut rng);
            let end = records.last().copied().unwrap() + 2.0;
            let steps = 200;
            let forward: Vec<f64> = (0..=steps).map(|k| end * k as f64 / steps as f64).collect();

            let mut hint = 0;
            for &time in &forward {
                let found = locate(&records, hint, time, DEFAULT_LOCATE_WINDOW);
                assert_eq!(found, reference(&records, time));
                assert!(found >= hint, "forward scrub went backwards");
                hint = found;
            }
            for &time in forward.iter().rev() {
                let found = locate(&records, hint, time, DEFAULT_LOCATE_WINDOW);
                assert_eq!(found, reference(&records, time));
                assert!(found <= hint, "backward scrub went forwards");
                hint = found;
            }
        }
    }

    #[test]
    fn exact_keyframe_times_land_on_that_keyframe() {
        let records: Vec<f64> = (0..30).map(|k| f64::from(k) * 0.5).collect();
        let mut hint = 17;
        for (k, &time) in records.iter().enumerate() {
            hint = locate(&records, hint, time, 2);
            assert_eq!(hint, k);
        }
    }
}
