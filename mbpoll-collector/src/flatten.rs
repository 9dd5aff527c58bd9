//! Value flattening.
//!
//! Turns one attribute value into labelled cells:
//! - scalar: one cell labelled with the attribute name
//! - array (any depth): one cell holding the whole `[a, b, [c]]` text
//! - composite: one cell per sub-key, labelled `attribute@key`, keys sorted
//!
//! Sorting composite keys keeps the column order identical across cycles
//! whatever order the endpoint returns fields in.

use mbpoll_endpoint::SampledValue;

/// Separator between attribute name and composite sub-key in labels.
pub const LABEL_SEPARATOR: char = '@';

/// A flattened cell: column label and text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub label: String,
    pub value: String,
}

impl Cell {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Flatten a fetched value into ordered cells.
pub fn flatten(attribute: &str, value: &SampledValue) -> Vec<Cell> {
    match value {
        SampledValue::Scalar(_) | SampledValue::Array(_) => {
            vec![Cell::new(attribute, value.to_string())]
        }
        SampledValue::Composite(entries) => {
            let mut sorted: Vec<&(String, SampledValue)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            sorted
                .into_iter()
                .map(|(key, sub)| {
                    Cell::new(
                        format!("{}{}{}", attribute, LABEL_SEPARATOR, key),
                        sub.to_string(),
                    )
                })
                .collect()
        }
    }
}
