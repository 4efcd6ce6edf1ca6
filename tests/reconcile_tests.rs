use indexmap::IndexMap;
use ringdef::DefError;
use ringdef::core::{DEFAULT_RING_SPACING, SeriesData, reconcile};
use ringdef::def_file::parse;

#[test]
fn short_velocity_curve_repeats_last_value() {
    let parsed = parse("NUR=5\nRADI=0 40 80 120 160\nVROT=10 20 30\n").expect("parse");
    let out = reconcile(parsed.series, parsed.ring_count, DEFAULT_RING_SPACING);
    assert_eq!(out.series["VROT"].values, vec![10.0, 20.0, 30.0, 30.0, 30.0]);
    assert_eq!(out.series["VROT"].uncertainties.len(), 5);
    assert!(out.ambiguities.is_empty());
}

#[test]
fn full_length_row_with_trailing_zeros_is_left_alone() {
    let parsed = parse("NUR=5\nRADI=0 40 80 120 160\nVROT=10 20 30 0 0\n").expect("parse");
    let out = reconcile(parsed.series, parsed.ring_count, DEFAULT_RING_SPACING);
    assert_eq!(out.series["VROT"].values, vec![10.0, 20.0, 30.0, 0.0, 0.0]);
    assert!(out.ambiguities.is_empty());
}

#[test]
fn radius_grid_continues_with_configured_spacing() {
    let parsed = parse("NUR=4\nRADI=10 20\n").expect("parse");
    let out = reconcile(parsed.series, parsed.ring_count, 25.0);
    assert_eq!(out.series["RADI"].values, vec![10.0, 20.0, 45.0, 70.0]);
}

#[test]
fn every_series_matches_ring_count() {
    let parsed = parse("NUR=4\nRADI=\nSBR=\nINCL=60\nPA=1 2 3 4\n").expect("parse");
    let out = reconcile(parsed.series, parsed.ring_count, DEFAULT_RING_SPACING);
    for (name, data) in &out.series {
        assert_eq!(data.values.len(), 4, "{name}");
        assert_eq!(data.uncertainties.len(), 4, "{name}");
    }
    assert_eq!(out.series["RADI"].values, vec![0.0, 40.0, 80.0, 120.0]);
    assert_eq!(out.series["SBR"].values, vec![0.0; 4]);
    assert_eq!(out.series["INCL"].values, vec![60.0; 4]);
}

#[test]
fn longer_series_is_preserved_and_reported() {
    let parsed = parse("NUR=2\nRADI=0 40\nPA=1 2 3\n").expect("parse");
    let out = reconcile(parsed.series, parsed.ring_count, DEFAULT_RING_SPACING);
    assert_eq!(out.series["PA"].values, vec![1.0, 2.0, 3.0]);
    assert_eq!(out.ambiguities.len(), 1);
    assert!(matches!(
        &out.ambiguities[0],
        DefError::ReconciliationAmbiguity { name, len: 3, declared: 2 } if name == "PA"
    ));
    assert!(out.ambiguities[0].is_recoverable());
}

#[test]
fn surplus_uncertainties_are_trimmed_and_short_ones_padded() {
    let mut series = IndexMap::new();
    let mut pa = SeriesData::new(vec![1.0, 2.0], 0);
    pa.uncertainties = vec![0.1, 0.2, 0.3, 0.4];
    series.insert("PA".to_owned(), pa);
    let mut incl = SeriesData::new(vec![5.0, 6.0, 7.0], 0);
    incl.uncertainties = vec![0.5];
    series.insert("INCL".to_owned(), incl);

    let out = reconcile(series, 3, DEFAULT_RING_SPACING);
    assert_eq!(out.series["PA"].values, vec![1.0, 2.0, 2.0]);
    assert_eq!(out.series["PA"].uncertainties, vec![0.1, 0.2, 0.3]);
    assert_eq!(out.series["INCL"].uncertainties[0], 0.5);
    assert!(out.series["INCL"].uncertainties[1].is_nan());
}
