use indexmap::IndexMap;
use tracing::debug;

/// `KEY=value` split of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive<'a> {
    /// Upper-cased key with all whitespace (and a leading `#`) removed.
    pub key: String,
    pub value: &'a str,
    /// Line starts with `#`.
    pub commented: bool,
}

impl Directive<'_> {
    pub(crate) fn tokens(&self) -> Vec<&str> {
        self.value.split_whitespace().collect()
    }
}

/// Splits `line` into a directive when it holds exactly one `=`.
pub(crate) fn split_directive(line: &str) -> Option<Directive<'_>> {
    if line.matches('=').count() != 1 {
        return None;
    }
    let (lhs, value) = line.split_once('=')?;
    let commented = lhs.trim_start().starts_with('#');
    let mut key: String = lhs.chars().filter(|c| !c.is_whitespace()).collect();
    if commented {
        key = key.trim_start_matches('#').to_owned();
    }
    Some(Directive {
        key: key.to_uppercase(),
        value,
        commented,
    })
}

/// Raw text of a `.def` file, line by line, terminators included.
///
/// Keeps an index from directive key to every line carrying it so edited
/// series can be written back in place while every other line stays
/// byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefDocument {
    lines: Vec<String>,
    key_index: IndexMap<String, Vec<usize>>,
}

impl DefDocument {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut document = Self {
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
            key_index: IndexMap::new(),
        };
        document.reindex();
        document
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line index of the last uncommented directive named `key`.
    #[must_use]
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.lines_of(key).last().copied()
    }

    /// Every uncommented line carrying directive `key`, in document order.
    #[must_use]
    pub fn lines_of(&self, key: &str) -> &[usize] {
        let key: String = key.chars().filter(|c| !c.is_whitespace()).collect();
        self.key_index
            .get(&key.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Right-hand side of directive `key`, trimmed.
    #[must_use]
    pub fn directive_value(&self, key: &str) -> Option<&str> {
        let line = self.lines.get(self.line_of(key)?)?;
        split_directive(line).map(|directive| directive.value.trim())
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.lines.concat()
    }

    pub(crate) fn replace_line(&mut self, index: usize, text: String) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = text;
        }
    }

    /// Appends a line, repairing a missing terminator on the previous one.
    pub(crate) fn push_line(&mut self, text: String) -> usize {
        if let Some(last) = self.lines.last_mut() {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
        self.lines.push(text);
        let index = self.lines.len() - 1;
        if let Some(directive) = split_directive(&self.lines[index]) {
            if !directive.commented {
                self.key_index.entry(directive.key).or_default().push(index);
            }
        }
        index
    }

    fn reindex(&mut self) {
        self.key_index.clear();
        for (index, line) in self.lines.iter().enumerate() {
            if let Some(directive) = split_directive(line) {
                if !directive.commented {
                    self.key_index.entry(directive.key).or_default().push(index);
                }
            }
        }
    }

    /// Rewrites control directives for an unattended modeling run.
    ///
    /// Sets `ACTION = 1`, `PROMPT = 0` and `PROGRESSLOG = progress`, drops
    /// any `GR_CONT` line and inserts `GR_CONT = ` right after `GR_DEVICE`.
    /// Applying it twice gives the same text.
    pub fn prepare_for_run(&mut self) {
        let mut rewritten = Vec::with_capacity(self.lines.len() + 1);
        for line in self.lines.drain(..) {
            let key = split_directive(&line)
                .filter(|directive| !directive.commented)
                .map(|directive| directive.key);
            match key.as_deref() {
                Some("ACTION") => rewritten.push("ACTION = 1\n".to_owned()),
                Some("PROMPT") => rewritten.push("PROMPT = 0\n".to_owned()),
                Some("PROGRESSLOG") => rewritten.push("PROGRESSLOG = progress\n".to_owned()),
                Some("GR_CONT") => {}
                Some("GR_DEVICE") => {
                    let mut device = line;
                    if !device.ends_with('\n') {
                        device.push('\n');
                    }
                    rewritten.push(device);
                    rewritten.push("GR_CONT = \n".to_owned());
                }
                _ => rewritten.push(line),
            }
        }
        self.lines = rewritten;
        self.reindex();
        debug!(lines = self.lines.len(), "prepared document for modeling run");
    }
}

#[cfg(test)]
mod tests {
    use super::{DefDocument, split_directive};

    #[test]
    fn directive_key_ignores_case_and_whitespace() {
        let directive = split_directive("  v rot = 1 2 3\n").expect("directive");
        assert_eq!(directive.key, "VROT");
        assert_eq!(directive.tokens(), vec!["1", "2", "3"]);
        assert!(!directive.commented);
    }

    #[test]
    fn lines_with_several_equals_are_not_directives() {
        assert!(split_directive("A=B=C").is_none());
        assert!(split_directive("no separator").is_none());
    }

    #[test]
    fn commented_directive_drops_hash() {
        let directive = split_directive("# VROT_ERR= 1 2").expect("directive");
        assert_eq!(directive.key, "VROT_ERR");
        assert!(directive.commented);
    }

    #[test]
    fn render_reproduces_input() {
        let text = "# header\nNUR=2\n  RADI = 0 40\nno newline";
        assert_eq!(DefDocument::from_text(text).render(), text);
    }

    #[test]
    fn line_lookup_skips_comments() {
        let document = DefDocument::from_text("# VROT= 1\nvrot = 2\n");
        assert_eq!(document.line_of("VROT"), Some(1));
        assert_eq!(document.directive_value("Vrot"), Some("2"));
    }

    #[test]
    fn duplicated_keys_index_every_line() {
        let document = DefDocument::from_text("VROT= 1 2\nPA= 3\n vrot = 5 6\n# VROT= 7\n");
        assert_eq!(document.lines_of("VROT"), &[0, 2]);
        assert_eq!(document.line_of("VROT"), Some(2));
        assert_eq!(document.directive_value("VROT"), Some("5 6"));
        assert!(document.lines_of("SBR").is_empty());
    }

    #[test]
    fn run_preparation_is_idempotent() {
        let mut document = DefDocument::from_text(
            "ACTION = 0\nPROMPT = 1\nGR_DEVICE = /xs\nGR_CONT = 1\nPROGRESSLOG = \n",
        );
        document.prepare_for_run();
        let once = document.render();
        assert_eq!(
            once,
            "ACTION = 1\nPROMPT = 0\nGR_DEVICE = /xs\nGR_CONT = \nPROGRESSLOG = progress\n"
        );
        document.prepare_for_run();
        assert_eq!(document.render(), once);
    }
}
