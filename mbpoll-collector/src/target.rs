//! Sampling targets.

/// One (object name, attribute) pair to sample.
///
/// A single pair of surrounding double quotes is stripped from both parts
/// at construction; quotes inside the string are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectAttributeRef {
    object_name: String,
    attribute: String,
}

impl ObjectAttributeRef {
    pub fn new(object_name: &str, attribute: &str) -> Self {
        Self {
            object_name: strip_quotes(object_name).to_string(),
            attribute: strip_quotes(attribute).to_string(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
