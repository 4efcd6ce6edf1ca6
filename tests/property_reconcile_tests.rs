use indexmap::IndexMap;
use proptest::prelude::*;
use ringdef::core::{SeriesData, reconcile};

fn values(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0f64..1_000.0, 0..=max_len)
}

proptest! {
    #[test]
    fn short_series_are_padded_without_touching_prefix(
        ring_count in 1usize..24,
        pa in values(24),
        radius in values(24),
        spacing in 1.0f64..100.0
    ) {
        prop_assume!(pa.len() <= ring_count && radius.len() <= ring_count);
        let mut input = IndexMap::new();
        input.insert("PA".to_owned(), SeriesData::new(pa.clone(), 0));
        input.insert("RADI".to_owned(), SeriesData::new(radius.clone(), 0));

        let out = reconcile(input, ring_count, spacing);
        prop_assert!(out.ambiguities.is_empty());

        let padded = &out.series["PA"];
        prop_assert_eq!(padded.values.len(), ring_count);
        prop_assert_eq!(padded.uncertainties.len(), ring_count);
        prop_assert_eq!(&padded.values[..pa.len()], pa.as_slice());
        let fill = pa.last().copied().unwrap_or(0.0);
        prop_assert!(padded.values[pa.len()..].iter().all(|v| *v == fill));

        let grid = &out.series["RADI"].values;
        prop_assert_eq!(grid.len(), ring_count);
        prop_assert_eq!(&grid[..radius.len()], radius.as_slice());
        let start = radius.len().max(1);
        for pair in grid[start - 1..].windows(2) {
            prop_assert!((pair[1] - pair[0] - spacing).abs() <= 1e-9);
        }
    }

    #[test]
    fn long_series_are_kept_and_reported(
        ring_count in 0usize..10,
        extra in 1usize..6,
        fill in -50.0f64..50.0
    ) {
        let long = vec![fill; ring_count + extra];
        let mut input = IndexMap::new();
        input.insert("INCL".to_owned(), SeriesData::new(long.clone(), 0));

        let out = reconcile(input, ring_count, 40.0);
        prop_assert_eq!(&out.series["INCL"].values, &long);
        prop_assert_eq!(out.ambiguities.len(), 1);
    }
}
