use tracing::debug;

use crate::core::precision::format_scientific;
use crate::core::series::ParameterSeries;
use crate::def_file::document::DefDocument;

/// Renders `values` as ` v1 v2 ...` in scientific notation.
#[must_use]
pub fn format_values(values: &[f64], precision: usize) -> String {
    values.iter().fold(String::new(), |mut out, value| {
        out.push(' ');
        out.push_str(&format_scientific(*value, precision));
        out
    })
}

/// Full data line for one series, terminator included.
#[must_use]
pub fn format_series_line(name: &str, values: &[f64], precision: usize) -> String {
    format!("    {name}={}\n", format_values(values, precision))
}

impl DefDocument {
    /// Writes one series into the document.
    ///
    /// Every directive line with the same key is replaced, duplicates
    /// included; otherwise a `# NAME parameter in UNIT` comment and the data
    /// line are appended.
    pub fn merge_one(&mut self, series: &ParameterSeries) {
        let line = format_series_line(series.name(), series.values(), series.decimal_precision());
        let indices = self.lines_of(series.name()).to_vec();
        if indices.is_empty() {
            debug!(parameter = series.name(), "appending new parameter line");
            self.push_line(format!(
                "# {} parameter in {}\n",
                series.name(),
                series.unit()
            ));
            self.push_line(line);
            return;
        }
        if indices.len() > 1 {
            debug!(
                parameter = series.name(),
                copies = indices.len(),
                "rewriting duplicated parameter rows"
            );
        }
        for index in indices {
            self.replace_line(index, line.clone());
        }
    }

    /// Merges every series in place.
    pub fn merge_series<'a, I>(&mut self, series: I)
    where
        I: IntoIterator<Item = &'a ParameterSeries>,
    {
        for entry in series {
            self.merge_one(entry);
        }
    }
}

/// Merge-writes `series` into a copy of `document` and returns the text.
///
/// Lines that do not belong to a given series are copied unchanged.
#[must_use]
pub fn serialize<'a, I>(document: &DefDocument, series: I) -> String
where
    I: IntoIterator<Item = &'a ParameterSeries>,
{
    let mut merged = document.clone();
    merged.merge_series(series);
    merged.render()
}
