use proptest::prelude::*;
use ringdef::api::{EditorConfig, Session};
use ringdef::core::{TypedValue, format_scientific, parse_number};

fn model(values: &[f64]) -> String {
    let radius: Vec<String> = (0..values.len()).map(|i| (i * 40).to_string()).collect();
    let vrot: Vec<String> = values.iter().map(|v| format!("{v:.2}")).collect();
    format!(
        "# generated\nNUR= {}\nRADI= {}\nVROT= {}\nGR_DEVICE= /null\n",
        values.len(),
        radius.join(" "),
        vrot.join(" ")
    )
}

proptest! {
    #[test]
    fn rendering_twice_gives_the_same_text(values in prop::collection::vec(0.0f64..400.0, 1..12)) {
        let mut session = Session::new(EditorConfig::default()).expect("session");
        session.load_str(&model(&values)).expect("load");
        let once = session.render();

        let mut reloaded = Session::new(EditorConfig::default()).expect("session");
        reloaded.load_str(&once).expect("reload");
        prop_assert_eq!(reloaded.render(), once);
    }

    #[test]
    fn scientific_text_parses_back_within_precision(
        value in -1.0e6f64..1.0e6,
        precision in 0usize..8
    ) {
        let text = format_scientific(value, precision);
        prop_assert!(matches!(TypedValue::classify(&text), TypedValue::Float));
        let parsed = parse_number(&text).expect("number");
        let magnitude = if value == 0.0 { 1.0 } else { 10f64.powf(value.abs().log10().floor()) };
        let step = magnitude * 10f64.powi(-(precision as i32));
        prop_assert!((parsed - value).abs() <= step * 0.5 + 1e-9 * magnitude);
    }
}
