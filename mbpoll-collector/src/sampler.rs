//! Single attribute sampling.
//!
//! Resolves one target against the endpoint, flattens the fetched value and
//! feeds the labels to the header while it is still being learned.

use mbpoll_endpoint::{EndpointError, ManagementEndpoint, ObjectName, ObjectNameError};
use thiserror::Error;

use crate::flatten::flatten;
use crate::header::HeaderTracker;
use crate::target::ObjectAttributeRef;

/// Errors from sampling one target.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("malformed object name [{object}]")]
    MalformedName {
        object: String,
        #[source]
        source: ObjectNameError,
    },

    #[error("object name [{0}] is a pattern and cannot be sampled")]
    PatternName(String),

    #[error("failed to read [{object}] attribute [{attribute}]")]
    Fetch {
        object: String,
        attribute: String,
        #[source]
        source: EndpointError,
    },
}

/// Fetch and flatten one target, returning its cell values in order.
pub fn sample<E>(
    target: &ObjectAttributeRef,
    endpoint: &E,
    header: &mut HeaderTracker,
) -> Result<Vec<String>, SampleError>
where
    E: ManagementEndpoint + ?Sized,
{
    let name = ObjectName::parse(target.object_name()).map_err(|source| {
        SampleError::MalformedName {
            object: target.object_name().to_string(),
            source,
        }
    })?;
    if name.is_pattern() {
        return Err(SampleError::PatternName(target.object_name().to_string()));
    }

    let value = endpoint
        .get_attribute(&name, target.attribute())
        .map_err(|source| SampleError::Fetch {
            object: target.object_name().to_string(),
            attribute: target.attribute().to_string(),
            source,
        })?;

    let cells = flatten(target.attribute(), &value);
    log::debug!(
        "sampled {} {} -> {} cell(s)",
        target.object_name(),
        target.attribute(),
        cells.len()
    );

    if header.is_learning() {
        header.record(cells.iter().map(|c| c.label.clone()));
    }
    Ok(cells.into_iter().map(|c| c.value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbpoll_endpoint::{MockEndpoint, MockFailure, SampledValue};

    const HEAP: &str = "java.lang:type=Memory";

    fn heap_endpoint() -> MockEndpoint {
        MockEndpoint::new().with_attribute(
            HEAP,
            "HeapMemoryUsage",
            SampledValue::composite([("used", 10_i64), ("max", 100), ("init", 1)]),
        )
    }

    #[test]
    fn test_sample_composite_records_labels() {
        let endpoint = heap_endpoint();
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new(HEAP, "HeapMemoryUsage");

        let values = sample(&target, &endpoint, &mut header).expect("sample");

        assert_eq!(values, vec!["1", "100", "10"]);
        assert_eq!(
            header.current_header(),
            [
                "HeapMemoryUsage@init",
                "HeapMemoryUsage@max",
                "HeapMemoryUsage@used"
            ]
        );
    }

    #[test]
    fn test_sample_frozen_header_untouched() {
        let endpoint = heap_endpoint();
        let mut header = HeaderTracker::new();
        header.record(["x"]);
        header.freeze();
        let target = ObjectAttributeRef::new(HEAP, "HeapMemoryUsage");

        let values = sample(&target, &endpoint, &mut header).expect("sample");

        assert_eq!(values.len(), 3);
        assert_eq!(header.current_header(), ["x"]);
    }

    #[test]
    fn test_sample_quoted_target_resolves() {
        let endpoint = MockEndpoint::new().with_attribute("app:name=queue", "Depth", 7_i64);
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new("\"app:name=queue\"", "\"Depth\"");

        let values = sample(&target, &endpoint, &mut header).expect("sample");

        assert_eq!(values, vec!["7"]);
        assert_eq!(endpoint.calls(), vec![("app:name=queue".to_string(), "Depth".to_string())]);
    }

    #[test]
    fn test_sample_malformed_name_fails_before_fetch() {
        let endpoint = MockEndpoint::new();
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new("no-colon-here", "Count");

        let err = sample(&target, &endpoint, &mut header).unwrap_err();

        assert!(matches!(err, SampleError::MalformedName { .. }));
        assert!(endpoint.calls().is_empty());
        assert!(header.current_header().is_empty());
    }

    #[test]
    fn test_sample_pattern_rejected() {
        let endpoint = MockEndpoint::new();
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new("java.lang:type=*", "Count");

        let err = sample(&target, &endpoint, &mut header).unwrap_err();

        assert!(matches!(err, SampleError::PatternName(_)));
        assert!(endpoint.calls().is_empty());
    }

    #[test]
    fn test_sample_unknown_attribute_is_fetch_error() {
        let endpoint = heap_endpoint();
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new(HEAP, "Missing");

        let err = sample(&target, &endpoint, &mut header).unwrap_err();

        match err {
            SampleError::Fetch {
                object,
                attribute,
                source,
            } => {
                assert_eq!(object, HEAP);
                assert_eq!(attribute, "Missing");
                assert!(matches!(source, EndpointError::AttributeNotFound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(header.current_header().is_empty());
    }

    #[test]
    fn test_sample_access_denied_is_fetch_error() {
        let endpoint = MockEndpoint::new().with_failure(HEAP, "Secret", MockFailure::AccessDenied);
        let mut header = HeaderTracker::new();
        let target = ObjectAttributeRef::new(HEAP, "Secret");

        let err = sample(&target, &endpoint, &mut header).unwrap_err();

        assert!(matches!(
            err,
            SampleError::Fetch {
                source: EndpointError::AccessDenied(_),
                ..
            }
        ));
    }
}
