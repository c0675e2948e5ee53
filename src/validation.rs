/// Cross-module validation of the parallel encoder.
///
/// These tests verify:
/// 1. **Round-trip correctness** for every worker count, even or uneven splits
/// 2. **Histogram conservation** against the number of bytes processed
/// 3. **Output layout** - per-worker ranges are disjoint, gapless, in order
/// 4. **Thread-count independence** of the histogram
/// 5. **Split artifacts** - adjacent runs across segments stay separate
#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::frequency::{self, Histogram};
    use crate::partition::{self, RemainderPolicy};
    use crate::pool::{compress, PzipOptions};
    use crate::rle;

    fn options(threads: usize, remainder: RemainderPolicy) -> PzipOptions {
        PzipOptions { threads, remainder }
    }

    /// Lowercase text with a bias toward runs.
    fn lowercase_text() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec((0u8..26, 1usize..12), 0..64).prop_map(|pairs| {
            let mut v = Vec::new();
            for (letter, len) in pairs {
                v.extend(std::iter::repeat(b'a' + letter).take(len));
            }
            v
        })
    }

    fn remainder_policy() -> impl Strategy<Value = RemainderPolicy> {
        prop_oneof![
            Just(RemainderPolicy::LastWorker),
            Just(RemainderPolicy::Truncate)
        ]
    }

    // ---------------------------------------------------------------
    // Deterministic cases
    // ---------------------------------------------------------------

    #[test]
    fn test_histogram_matches_direct_count() {
        let input: Vec<u8> = b"thequickbrownfoxjumpsoverthelazydog".repeat(40);
        for threads in [1, 2, 4, 8] {
            let out = compress(&input, &options(threads, RemainderPolicy::LastWorker)).unwrap();
            assert_eq!(out.histogram, frequency::get_frequency(&input));
        }
    }

    #[test]
    fn test_truncation_drops_exactly_the_remainder() {
        let input = b"abcdefghijklm"; // 13 bytes
        for threads in 1..=13usize {
            let out = compress(input, &options(threads, RemainderPolicy::Truncate)).unwrap();
            let kept = threads * (input.len() / threads);
            assert_eq!(out.processed_len, kept);
            assert_eq!(out.decode(), &input[..kept]);
            assert_eq!(out.histogram.total(), kept as u64);
        }
    }

    #[test]
    fn test_single_worker_equals_serial_rle() {
        let input: Vec<u8> = (0..5000u32).map(|i| b'a' + ((i / 3) % 7) as u8).collect();
        let out = compress(&input, &options(1, RemainderPolicy::LastWorker)).unwrap();
        assert_eq!(out.runs, rle::encode(&input));
    }

    #[test]
    fn test_run_count_grows_only_at_boundaries() {
        // Parallel output has at most one extra run per segment boundary.
        let input: Vec<u8> = (0..4096u32).map(|i| b'a' + ((i / 50) % 26) as u8).collect();
        let serial = rle::encode(&input).len();
        for threads in [2, 4, 8, 16] {
            let out = compress(&input, &options(threads, RemainderPolicy::LastWorker)).unwrap();
            assert!(out.runs.len() >= serial);
            assert!(out.runs.len() <= serial + threads - 1);
        }
    }

    // ---------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_round_trip(
            input in lowercase_text(),
            threads in 1usize..10,
            remainder in remainder_policy(),
        ) {
            let out = compress(&input, &options(threads, remainder)).unwrap();
            prop_assert_eq!(out.decode(), &input[..out.processed_len]);
        }

        #[test]
        fn prop_histogram_conservation(
            input in lowercase_text(),
            threads in 1usize..10,
            remainder in remainder_policy(),
        ) {
            let out = compress(&input, &options(threads, remainder)).unwrap();
            let workers = threads.min(input.len());
            prop_assert_eq!(
                out.processed_len,
                partition::processed_len(input.len(), workers, remainder)
            );
            prop_assert_eq!(out.histogram.total(), out.processed_len as u64);
            prop_assert_eq!(
                out.histogram,
                Histogram::from_runs(&rle::encode(&input[..out.processed_len]))
            );
        }

        #[test]
        fn prop_worker_ranges_disjoint_and_ordered(
            input in lowercase_text(),
            threads in 1usize..10,
            remainder in remainder_policy(),
        ) {
            let out = compress(&input, &options(threads, remainder)).unwrap();
            let segs = partition::partition(input.len(), out.worker_ranges.len(), remainder);
            let mut next = 0;
            for (range, seg) in out.worker_ranges.iter().zip(&segs) {
                prop_assert_eq!(range.start, next);
                prop_assert!(range.end > range.start, "every segment yields a run");
                prop_assert_eq!(rle::encode_segment(seg.slice(&input)), out.runs[range.clone()].to_vec());
                next = range.end;
            }
            prop_assert_eq!(next, out.runs.len());
        }

        #[test]
        fn prop_histogram_independent_of_threads(input in lowercase_text()) {
            let reference = compress(&input, &options(1, RemainderPolicy::LastWorker)).unwrap();
            for threads in [2usize, 4, 8] {
                let out = compress(&input, &options(threads, RemainderPolicy::LastWorker)).unwrap();
                prop_assert_eq!(out.histogram, reference.histogram);
            }
        }
    }
}
