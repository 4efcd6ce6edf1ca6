use std::sync::Arc;

use ringdef::core::{ParameterSeries, RadiusAxis, format_scientific, reconcile};
use ringdef::def_file::{DefDocument, parse, serialize};

const SAMPLE: &str = "\
# model
NUR= 3
RADI= 0 40 80
VROT= 10.5 20.25 30.001
PA= 44 46 47
GR_DEVICE= /null
";

fn loaded_series(text: &str) -> (DefDocument, Vec<ParameterSeries>) {
    let parsed = parse(text).expect("parse");
    let reconciled = reconcile(parsed.series, parsed.ring_count, 40.0);
    let radius: RadiusAxis = Arc::from(reconciled.series["RADI"].values.as_slice());
    let series = reconciled
        .series
        .into_iter()
        .map(|(name, data)| ParameterSeries::from_data(&name, data, Arc::clone(&radius)))
        .collect();
    (parsed.document, series)
}

#[test]
fn scientific_rendering_matches_exponent_layout() {
    assert_eq!(format_scientific(12.34, 3), "1.234E+01");
    assert_eq!(format_scientific(0.5, 1), "5.0E-01");
    assert_eq!(format_scientific(f64::NAN, 2), "NAN");
}

#[test]
fn unchanged_series_are_rewritten_in_scientific_notation() {
    let (document, series) = loaded_series(SAMPLE);
    let text = serialize(&document, &series);
    assert_eq!(
        text,
        "\
# model
NUR= 3
    RADI= 0E+00 4E+01 8E+01
    VROT= 1.050E+01 2.025E+01 3.000E+01
    PA= 4E+01 5E+01 5E+01
GR_DEVICE= /null
"
    );
}

#[test]
fn serialize_is_idempotent() {
    let (document, series) = loaded_series(SAMPLE);
    let once = serialize(&document, &series);
    let (document, series) = loaded_series(&once);
    let twice = serialize(&document, &series);
    assert_eq!(once, twice);
}

#[test]
fn serialize_without_series_copies_text() {
    let (document, _) = loaded_series(SAMPLE);
    assert_eq!(serialize(&document, std::iter::empty::<&ParameterSeries>()), SAMPLE);
}

#[test]
fn edited_values_replace_only_their_line() {
    let (document, mut series) = loaded_series(SAMPLE);
    let vrot = series
        .iter_mut()
        .find(|s| s.name() == "VROT")
        .expect("VROT");
    vrot.commit(vec![11.0, 22.0, 33.5]).expect("commit");
    let text = serialize(&document, series.iter().filter(|s| s.name() == "VROT"));
    assert_eq!(
        text,
        "\
# model
NUR= 3
RADI= 0 40 80
    VROT= 1.100E+01 2.200E+01 3.350E+01
PA= 44 46 47
GR_DEVICE= /null
"
    );
}

#[test]
fn new_parameter_is_appended_with_unit_comment() {
    let (document, _) = loaded_series("NUR= 2\nRADI= 0 40");
    let radius: RadiusAxis = Arc::from(vec![0.0, 40.0]);
    let sdis = ParameterSeries::new("SDIS", vec![8.0, 8.0], radius).with_decimal_precision(1);
    assert_eq!(
        serialize(&document, [&sdis]),
        "NUR= 2\nRADI= 0 40\n# SDIS parameter in km s-1\n    SDIS= 8.0E+00 8.0E+00\n"
    );
}

#[test]
fn merge_in_place_tracks_appended_lines() {
    let (mut document, _) = loaded_series("NUR= 1\nRADI= 0\n");
    let radius: RadiusAxis = Arc::from(vec![0.0]);
    let vsys = ParameterSeries::new("VSYS", vec![1500.0], radius);
    document.merge_one(&vsys);
    let appended = document.line_of("VSYS").expect("indexed");
    document.merge_one(&vsys);
    assert_eq!(document.line_of("VSYS"), Some(appended));
    assert_eq!(document.render().matches("VSYS=").count(), 1);
}

#[test]
fn run_preparation_rewrites_control_directives() {
    let mut document = DefDocument::from_text(
        "ACTION = 0\nPROMPT= 1\nGR_DEVICE= /xs\nGR_CONT= yes\nPROGRESSLOG=\nRADI= 0\n",
    );
    document.prepare_for_run();
    assert_eq!(
        document.render(),
        "ACTION = 1\nPROMPT = 0\nGR_DEVICE= /xs\nGR_CONT = \nPROGRESSLOG = progress\nRADI= 0\n"
    );
}

#[test]
fn duplicated_rows_are_all_rewritten() {
    let text = "NUR= 2\nRADI= 0 40\nVROT= 1 2\nPA= 3 4\nvrot = 5 6\n";
    let (document, mut series) = loaded_series(text);
    assert_eq!(document.lines_of("VROT"), &[2, 4]);
    let vrot = series
        .iter_mut()
        .find(|s| s.name() == "VROT")
        .expect("VROT");
    assert_eq!(vrot.values(), &[5.0, 6.0]);
    vrot.commit(vec![9.0, 6.0]).expect("commit");

    let merged = serialize(&document, series.iter().filter(|s| s.name() == "VROT"));
    assert_eq!(
        merged,
        "NUR= 2\nRADI= 0 40\n    VROT= 9E+00 6E+00\nPA= 3 4\n    VROT= 9E+00 6E+00\n"
    );
}
