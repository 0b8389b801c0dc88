//! Deterministic cache keys.
//!
//! A fingerprint is built from named sections, each holding the values of
//! one input that affects the cached result. Values within a section and
//! the sections themselves are sorted, so equivalent inputs supplied in a
//! different order produce the same key. Separator characters inside values
//! are escaped, so distinct inputs never produce the same key.

use std::collections::BTreeMap;
use std::fmt;

/// Builder for cache keys.
///
/// # Example
///
/// ```
/// use workforce_stats::cache::Fingerprint;
///
/// let a = Fingerprint::new()
///     .section("periods", ["2026-02", "2026-01"])
///     .section("employees", ["emp_b", "emp_a"])
///     .build();
/// let b = Fingerprint::new()
///     .section("employees", ["emp_a", "emp_b"])
///     .section("periods", ["2026-01", "2026-02"])
///     .build();
///
/// assert_eq!(a, b);
/// assert_eq!(a, "employees=emp_a,emp_b|periods=2026-01,2026-02");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    sections: BTreeMap<String, Vec<String>>,
}

impl Fingerprint {
    /// Creates an empty fingerprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds values to a named section, creating it if needed.
    pub fn section<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.sections
            .entry(escape(name))
            .or_default()
            .extend(values.into_iter().map(|v| escape(&v.to_string())));
        self
    }

    /// Adds a single value to a named section.
    pub fn value(self, name: &str, value: impl ToString) -> Self {
        self.section(name, [value.to_string()])
    }

    /// Renders the key.
    pub fn build(&self) -> String {
        self.sections
            .iter()
            .map(|(name, values)| {
                if values.is_empty() {
                    return name.clone();
                }
                let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                format!("{}={}", name, sorted.join(","))
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | ',' | '|' | '=') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
