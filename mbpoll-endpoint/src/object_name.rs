//! Managed object names.
//!
//! Names follow the `domain:key=value[,key=value]*` grammar. Values are
//! either unquoted (no `,` `=` `:` `"`) or a quoted string with backslash
//! escapes. `*` and `?` in the domain or a value, or a bare `*` property,
//! turn the name into a pattern usable for listing but not for sampling.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Errors from object name parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectNameError {
    #[error("missing ':' between domain and key properties in '{0}'")]
    MissingSeparator(String),

    #[error("domain contains a newline in '{0}'")]
    InvalidDomain(String),

    #[error("empty key property list in '{0}'")]
    EmptyKeyList(String),

    #[error("empty key property in '{0}'")]
    EmptyProperty(String),

    #[error("invalid key '{key}' in '{name}'")]
    InvalidKey { name: String, key: String },

    #[error("invalid value for key '{key}' in '{name}'")]
    InvalidValue { name: String, key: String },

    #[error("duplicate key '{key}' in '{name}'")]
    DuplicateKey { name: String, key: String },

    #[error("unterminated quoted value in '{0}'")]
    UnterminatedQuote(String),
}

/// Key property that orders names within a domain.
pub const TYPE_KEY: &str = "type";

/// A parsed managed object name.
///
/// Equality and hashing use the canonical form (properties sorted by key).
/// Ordering compares the domain, then the `type` key value (missing sorts as
/// empty), then the canonical key list. `Display` returns the name as it was
/// written.
#[derive(Debug, Clone)]
pub struct ObjectName {
    raw: String,
    domain: String,
    properties: Vec<(String, String)>,
    list_pattern: bool,
    canonical: String,
}

impl ObjectName {
    /// Parse a name, validating the grammar.
    pub fn parse(name: &str) -> Result<Self, ObjectNameError> {
        let (domain, mut rest) = name
            .split_once(':')
            .ok_or_else(|| ObjectNameError::MissingSeparator(name.to_string()))?;

        if domain.contains('\n') {
            return Err(ObjectNameError::InvalidDomain(name.to_string()));
        }
        if rest.is_empty() {
            return Err(ObjectNameError::EmptyKeyList(name.to_string()));
        }

        let mut properties: Vec<(String, String)> = Vec::new();
        let mut list_pattern = false;

        loop {
            if rest == "*" || rest.starts_with("*,") {
                if list_pattern {
                    return Err(ObjectNameError::DuplicateKey {
                        name: name.to_string(),
                        key: "*".to_string(),
                    });
                }
                list_pattern = true;
                rest = &rest[1..];
            } else {
                let (key, after_key) = rest
                    .split_once('=')
                    .ok_or_else(|| ObjectNameError::InvalidKey {
                        name: name.to_string(),
                        key: rest.split(',').next().unwrap_or_default().to_string(),
                    })?;

                if !is_valid_key(key) {
                    return Err(ObjectNameError::InvalidKey {
                        name: name.to_string(),
                        key: key.to_string(),
                    });
                }

                let (value, after_value) = split_value(name, key, after_key)?;

                if properties.iter().any(|(k, _)| k == key) {
                    return Err(ObjectNameError::DuplicateKey {
                        name: name.to_string(),
                        key: key.to_string(),
                    });
                }
                properties.push((key.to_string(), value.to_string()));
                rest = after_value;
            }

            match rest.strip_prefix(',') {
                None if rest.is_empty() => break,
                Some("") => return Err(ObjectNameError::EmptyProperty(name.to_string())),
                Some(next) => rest = next,
                // split_value only stops at ',' or the end of input
                None => unreachable!("property parser stopped mid-token"),
            }
        }

        let canonical = canonical_form(domain, &properties, list_pattern);

        Ok(Self {
            raw: name.to_string(),
            domain: domain.to_string(),
            properties,
            list_pattern,
            canonical,
        })
    }

    /// The name exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Domain part (may be empty).
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Value of a key property, quotes included when the value was quoted.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key properties in the order written.
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Canonical form: domain, then properties sorted by key.
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// True when the name contains any wildcard.
    pub fn is_pattern(&self) -> bool {
        self.list_pattern
            || has_wildcard(&self.domain)
            || self.properties.iter().any(|(_, v)| has_wildcard(v))
    }

    /// Check whether this concrete name is selected by `pattern`.
    ///
    /// A non-pattern `pattern` only matches an equal name.
    pub fn matches(&self, pattern: &ObjectName) -> bool {
        if self.is_pattern() || !wildcard_match(&pattern.domain, &self.domain) {
            return false;
        }
        if !pattern.list_pattern && pattern.properties.len() != self.properties.len() {
            return false;
        }
        pattern
            .properties
            .iter()
            .all(|(key, wanted)| match self.property(key) {
                Some(actual) => wildcard_match(wanted, actual),
                None => false,
            })
    }

    /// The pattern that selects every name.
    pub fn wildcard() -> Self {
        Self {
            raw: "*:*".to_string(),
            domain: "*".to_string(),
            properties: Vec::new(),
            list_pattern: true,
            canonical: "*:*".to_string(),
        }
    }

    fn sort_key(&self) -> (&str, &str, &str) {
        let props = &self.canonical[self.domain.len() + 1..];
        (&self.domain, self.property(TYPE_KEY).unwrap_or_default(), props)
    }
}

impl FromStr for ObjectName {
    type Err = ObjectNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for ObjectName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains([':', '=', ',', '*', '?', '\n', '"'])
}

/// Split one value off the front of `input`, returning the value and the
/// remainder (which is empty or starts with ',').
fn split_value<'a>(
    name: &str,
    key: &str,
    input: &'a str,
) -> Result<(&'a str, &'a str), ObjectNameError> {
    if input.starts_with('"') {
        let mut escaped = false;
        for (idx, ch) in input.char_indices().skip(1) {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '\n' => break,
                '"' => {
                    let (value, rest) = input.split_at(idx + 1);
                    if !rest.is_empty() && !rest.starts_with(',') {
                        return Err(ObjectNameError::InvalidValue {
                            name: name.to_string(),
                            key: key.to_string(),
                        });
                    }
                    return Ok((value, rest));
                }
                _ => {}
            }
        }
        return Err(ObjectNameError::UnterminatedQuote(name.to_string()));
    }

    let end = input.find(',').unwrap_or(input.len());
    let (value, rest) = input.split_at(end);
    if value.contains(['=', ':', '"', '\n']) {
        return Err(ObjectNameError::InvalidValue {
            name: name.to_string(),
            key: key.to_string(),
        });
    }
    Ok((value, rest))
}

fn canonical_form(domain: &str, properties: &[(String, String)], list_pattern: bool) -> String {
    let mut sorted: Vec<&(String, String)> = properties.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut props: Vec<String> = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
    if list_pattern {
        props.push("*".to_string());
    }
    format!("{}:{}", domain, props.join(","))
}

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Glob match supporting `*` (any run) and `?` (any single char).
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
