use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, warn};

use crate::core::precision::max_fractional_digits;
use crate::core::series::SeriesData;
use crate::core::typed_value::{TypedValue, parse_number};
use crate::core::units::{RADIUS_KEY, is_well_known};
use crate::def_file::document::{DefDocument, Directive, split_directive};
use crate::error::{DefError, DefResult};

const RING_COUNT_KEY: &str = "NUR";
const INSET_KEY: &str = "INSET";
const LOOPS_KEY: &str = "LOOPS";
const UNCERTAINTY_SUFFIX: &str = "_ERR";

/// Largest `NUR` accepted; every series is padded to this length on load.
pub const MAX_RING_COUNT: usize = 100_000;

/// Run metadata read alongside the ring series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefMetadata {
    /// Data-cube filename, relative to the `.def` file.
    pub inset: Option<String>,
    pub loops: Option<u32>,
}

/// Result of parsing a `.def` text.
#[derive(Debug, Clone)]
pub struct ParsedDef {
    pub document: DefDocument,
    /// Ring series by upper-case name, in document order. Uncertainty rows
    /// are already attached.
    pub series: IndexMap<String, SeriesData>,
    pub ring_count: usize,
    pub metadata: DefMetadata,
}

/// Parses `.def` text into typed series.
///
/// Lines that are not recognised as ring series stay in the returned
/// document untouched.
pub fn parse(text: &str) -> DefResult<ParsedDef> {
    let document = DefDocument::from_text(text);
    let ring_count = read_ring_count(document.lines())?;

    let mut series: IndexMap<String, SeriesData> = IndexMap::new();
    let mut uncertainties: IndexMap<String, Vec<f64>> = IndexMap::new();
    let mut metadata = DefMetadata::default();

    for line in document.lines() {
        let Some(directive) = split_directive(line) else {
            continue;
        };

        if let Some(name) = directive.key.strip_suffix(UNCERTAINTY_SUFFIX) {
            if let Some(errors) = parse_uncertainty_row(name, &directive) {
                uncertainties.insert(name.to_owned(), errors);
            }
            continue;
        }
        if directive.commented {
            continue;
        }

        match directive.key.as_str() {
            RING_COUNT_KEY => {}
            INSET_KEY => {
                let inset: String = directive
                    .value
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                metadata.inset = (!inset.is_empty()).then_some(inset);
            }
            LOOPS_KEY => {
                let token = directive.value.split_whitespace().next().unwrap_or("");
                match token.parse::<u32>() {
                    Ok(loops) => metadata.loops = Some(loops),
                    Err(_) => warn!(value = token, "ignoring unparsable LOOPS"),
                }
            }
            _ => {
                if let Some(data) = parse_series_row(&directive, ring_count)? {
                    series.insert(directive.key.clone(), data);
                }
            }
        }
    }

    for (name, errors) in uncertainties {
        match series.get_mut(&name) {
            Some(data) => data.uncertainties = errors,
            None => debug!(parameter = %name, "uncertainty row without a series"),
        }
    }

    if !series.contains_key(RADIUS_KEY) {
        return Err(DefError::MissingRadiusAxis);
    }

    debug!(
        rings = ring_count,
        series = series.len(),
        lines = document.line_count(),
        "parsed def document"
    );

    Ok(ParsedDef {
        document,
        series,
        ring_count,
        metadata,
    })
}

/// Reads the first uncommented `NUR` directive.
pub fn read_ring_count(lines: &[String]) -> DefResult<usize> {
    let directive = lines
        .iter()
        .filter_map(|line| split_directive(line))
        .find(|directive| !directive.commented && directive.key == RING_COUNT_KEY)
        .ok_or(DefError::MissingRingCount)?;

    let token = directive.value.split_whitespace().next().unwrap_or("");
    let invalid = || DefError::InvalidRingCount {
        token: token.to_owned(),
    };
    let count = match token.parse::<usize>() {
        Ok(count) => count,
        // `NUR = 12.0` is accepted as long as it is a whole, non-negative number.
        Err(_) => match parse_number(token) {
            Some(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
                value as usize
            }
            _ => return Err(invalid()),
        },
    };
    if count > MAX_RING_COUNT {
        warn!(rings = count, max = MAX_RING_COUNT, "ring count out of range");
        return Err(invalid());
    }
    Ok(count)
}

fn parse_uncertainty_row(name: &str, directive: &Directive<'_>) -> Option<Vec<f64>> {
    let mut errors = Vec::new();
    for token in directive.value.split_whitespace() {
        match parse_number(token) {
            Some(value) => errors.push(value),
            None => {
                warn!(parameter = name, token, "skipping malformed uncertainty row");
                return None;
            }
        }
    }
    Some(errors)
}

fn parse_series_row(
    directive: &Directive<'_>,
    ring_count: usize,
) -> DefResult<Option<SeriesData>> {
    let tokens = directive.tokens();
    let sized_like_rings = !tokens.is_empty() && tokens.len() == ring_count;
    if !samples_are_numeric(&tokens) || !(sized_like_rings || is_well_known(&directive.key)) {
        return Ok(None);
    }

    let mut values = Vec::with_capacity(tokens.len());
    for token in &tokens {
        match parse_number(token) {
            Some(value) => values.push(value),
            // Only rows that must be series fail the load.
            None if is_well_known(&directive.key) => {
                return Err(DefError::Parse(format!(
                    "parameter `{}` has malformed value `{token}`",
                    directive.key
                )));
            }
            None => {
                debug!(key = %directive.key, token = *token, "row kept verbatim");
                return Ok(None);
            }
        }
    }

    Ok(Some(SeriesData::new(values, max_fractional_digits(&tokens))))
}

/// Checks the first, middle and last tokens; an empty row passes.
fn samples_are_numeric(tokens: &[&str]) -> bool {
    let samples: SmallVec<[&str; 3]> = match tokens {
        [] => SmallVec::new(),
        [.., last] => smallvec![tokens[0], tokens[tokens.len() / 2], *last],
    };
    samples
        .iter()
        .all(|token| TypedValue::classify(token).is_numeric())
}

#[cfg(test)]
mod tests {
    use super::{read_ring_count, samples_are_numeric};
    use crate::error::DefError;

    fn lines(text: &str) -> Vec<String> {
        text.split_inclusive('\n').map(str::to_owned).collect()
    }

    #[test]
    fn ring_count_takes_first_token() {
        assert_eq!(read_ring_count(&lines("NUR = 7 rings\n")).expect("nur"), 7);
        assert_eq!(read_ring_count(&lines("NUR=3.0\n")).expect("nur"), 3);
    }

    #[test]
    fn commented_ring_count_is_ignored() {
        let err = read_ring_count(&lines("# NUR = 7\n")).expect_err("missing");
        assert!(matches!(err, DefError::MissingRingCount));
    }

    #[test]
    fn fractional_ring_count_is_invalid() {
        let err = read_ring_count(&lines("NUR = 2.5\n")).expect_err("invalid");
        assert!(matches!(err, DefError::InvalidRingCount { token } if token == "2.5"));
    }

    #[test]
    fn sampling_checks_first_middle_last() {
        assert!(samples_are_numeric(&["1", "x", "2", "3"]));
        assert!(!samples_are_numeric(&["1", "2", "x", "3"]));
        assert!(!samples_are_numeric(&["cube.fits"]));
        assert!(samples_are_numeric(&[]));
    }
}
