//! Fragment ordering keys.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a fragment within its target file.
///
/// Keys compare naturally: they are split into runs of ASCII digits and runs
/// of everything else, digit runs compare by numeric value and other runs
/// lexically, and a digit run sorts before a text run. Keys that are equal
/// under that rule (`"020"` and `"20"`) fall back to plain string order, so
/// the ordering stays total.
///
/// ```toml
/// order = 20
/// order = "20-puppet00-01"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "OrderValue", into = "String")]
pub struct OrderKey(String);

impl OrderKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderKey {
    fn default() -> Self {
        Self(String::from("20"))
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for OrderKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<u64> for OrderKey {
    fn from(key: u64) -> Self {
        Self(key.to_string())
    }
}

impl From<OrderKey> for String {
    fn from(key: OrderKey) -> Self {
        key.0
    }
}

/// Manifest form of an order, which may be written as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrderValue {
    Number(u64),
    Text(String),
}

impl From<OrderValue> for OrderKey {
    fn from(value: OrderValue) -> Self {
        match value {
            OrderValue::Number(number) => number.into(),
            OrderValue::Text(text) => text.into(),
        }
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = Runs::new(&self.0);
        let mut right = Runs::new(&other.0);

        loop {
            match (left.next(), right.next()) {
                (None, None) => break,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match a.compare(b) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
            }
        }

        self.0.cmp(&other.0)
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl Run<'_> {
    fn compare(self, other: Self) -> Ordering {
        match (self, other) {
            (Run::Digits(a), Run::Digits(b)) => {
                let a = a.trim_start_matches('0');
                let b = b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Run::Text(a), Run::Text(b)) => a.cmp(b),
            (Run::Digits(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
        }
    }
}

/// Splits a key into alternating digit and non-digit runs.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Runs<'a> {
    fn new(key: &'a str) -> Self {
        Self { rest: key }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());

        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;

        Some(if digits { Run::Digits(run) } else { Run::Text(run) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(keys: &[&str]) -> Vec<String> {
        let mut keys: Vec<OrderKey> = keys.iter().map(|key| OrderKey::from(*key)).collect();
        keys.sort();
        keys.into_iter().map(String::from).collect()
    }

    #[test]
    fn numbers_sort_numerically() {
        assert_eq!(sorted(&["100", "20", "9", "10"]), vec!["9", "10", "20", "100"]);
    }

    #[test]
    fn mixed_keys() {
        assert_eq!(
            sorted(&["x", "10a", "10", "9", "20-b", "20-a"]),
            vec!["9", "10", "10a", "20-a", "20-b", "x"]
        );
    }

    #[test]
    fn leading_zeros_tie_break_on_text() {
        let padded = OrderKey::from("020");
        let plain = OrderKey::from("20");

        assert_ne!(padded.cmp(&plain), Ordering::Equal);
        assert_eq!(padded.cmp(&plain), "020".cmp("20"));
    }

    #[test]
    fn default_is_twenty() {
        assert_eq!(OrderKey::default().as_str(), "20");
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        #[derive(Deserialize)]
        struct Doc {
            a: OrderKey,
            b: OrderKey,
        }

        let doc: Doc = toml::from_str("a = 15\nb = \"15-web\"").unwrap();
        assert_eq!(doc.a.as_str(), "15");
        assert_eq!(doc.b.as_str(), "15-web");
    }
}
