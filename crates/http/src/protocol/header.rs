//! Ordered, verbatim header lines.
//!
//! Header fields are kept exactly as they were received (or added), one
//! `name: value` line per entry, and looked up by case-insensitive name.

/// An ordered sequence of raw header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLines {
    lines: Vec<String>,
}

impl HeaderLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { lines: Vec::with_capacity(capacity) }
    }

    /// Appends a line verbatim. The caller guarantees it contains a colon.
    pub(crate) fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Appends `name: value`.
    pub fn append(&mut self, name: &str, value: impl std::fmt::Display) {
        self.lines.push(format!("{name}: {value}"));
    }

    /// Returns the trimmed value of the first line named `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Returns the trimmed values of every line named `name`, in order.
    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.lines.iter().filter_map(move |line| {
            let (line_name, value) = split_line(line)?;
            line_name.eq_ignore_ascii_case(name).then_some(value)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the raw lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name.trim(), value.trim()))
}
