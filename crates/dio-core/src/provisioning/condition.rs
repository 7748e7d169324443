use std::fmt;

use crate::property::{PropertyStore, stringify};

/// Property predicate guarding a queued bean.
///
/// A condition with an empty `property_key` always holds. Otherwise the
/// property is looked up: a miss matches only an empty `compare_value`, and a
/// hit is compared through its canonical string form. `must_match = false`
/// negates the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub property_key: String,
    pub compare_value: String,
    pub must_match: bool,
    pub case_insensitive: bool,
}

impl Condition {
    /// Holds when `key` equals `value` (case-insensitively by default).
    pub fn on_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_key: key.into(),
            compare_value: value.into(),
            must_match: true,
            case_insensitive: true,
        }
    }

    /// Negation of [`on_property`](Self::on_property) for the same inputs.
    pub fn not_on_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            must_match: false,
            ..Self::on_property(key, value)
        }
    }

    pub fn unconditional() -> Self {
        Self {
            property_key: String::new(),
            compare_value: String::new(),
            must_match: true,
            case_insensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_insensitive = !case_sensitive;
        self
    }

    pub fn is_unconditional(&self) -> bool {
        self.property_key.is_empty()
    }

    /// Evaluate against the current property snapshot.
    pub fn matches(&self, store: &PropertyStore) -> bool {
        if self.is_unconditional() {
            return true;
        }
        let matched = match store.get(&self.property_key) {
            None => self.compare_value.is_empty(),
            Some(value) => {
                let actual = stringify(&value);
                if self.case_insensitive {
                    actual.to_lowercase() == self.compare_value.to_lowercase()
                } else {
                    actual == self.compare_value
                }
            }
        };
        if self.must_match { matched } else { !matched }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::unconditional()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unconditional() {
            return write!(f, "always");
        }
        let op = if self.must_match { "==" } else { "!=" };
        write!(f, "{} {} '{}'", self.property_key, op, self.compare_value)?;
        if self.case_insensitive {
            write!(f, " (ignore case)")?;
        }
        Ok(())
    }
}
