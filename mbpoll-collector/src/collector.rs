//! One poll cycle.
//!
//! Samples every target in configuration order and joins the fragments
//! into a single row. A row is produced only when every target succeeded.

use std::fmt;

use mbpoll_clock::Clock;
use mbpoll_endpoint::ManagementEndpoint;

use crate::header::HeaderTracker;
use crate::sampler::{sample, SampleError};
use crate::target::ObjectAttributeRef;

/// Column label used for the optional timestamp cell.
pub const TIMESTAMP_LABEL: &str = "timestamp";

/// Cells of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cells.join(","))
    }
}

/// Perform a single collection cycle.
///
/// When `clock` is given the row starts with a timestamp cell taken before
/// the first fetch. Labels are recorded only while the header is learning.
pub fn collect_row<E>(
    targets: &[ObjectAttributeRef],
    endpoint: &E,
    header: &mut HeaderTracker,
    clock: Option<&dyn Clock>,
) -> Result<Row, SampleError>
where
    E: ManagementEndpoint + ?Sized,
{
    let mut cells = Vec::new();

    if let Some(clock) = clock {
        if header.is_learning() {
            header.record([TIMESTAMP_LABEL]);
        }
        cells.push(clock.timestamp_cell());
    }

    for target in targets {
        cells.extend(sample(target, endpoint, header)?);
    }

    Ok(Row { cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbpoll_clock::MockClock;
    use mbpoll_endpoint::{MockEndpoint, MockFailure, SampledValue};

    fn two_target_endpoint() -> MockEndpoint {
        MockEndpoint::new()
            .with_attribute("o1:k=1", "A1", SampledValue::composite([("y", 2_i64), ("x", 1)]))
            .with_attribute("o2:k=2", "A2", "hi")
    }

    fn two_targets() -> Vec<ObjectAttributeRef> {
        vec![
            ObjectAttributeRef::new("o1:k=1", "A1"),
            ObjectAttributeRef::new("o2:k=2", "A2"),
        ]
    }

    #[test]
    fn test_first_row_and_header() {
        let endpoint = two_target_endpoint();
        let mut header = HeaderTracker::new();

        let row = collect_row(&two_targets(), &endpoint, &mut header, None).expect("row");

        assert_eq!(row.to_string(), "1,2,hi");
        assert_eq!(header.header_line(), "A1@x,A1@y,A2");
    }

    #[test]
    fn test_targets_fetched_in_order() {
        let endpoint = two_target_endpoint();
        let mut header = HeaderTracker::new();

        collect_row(&two_targets(), &endpoint, &mut header, None).expect("row");

        let objects: Vec<String> = endpoint.calls().into_iter().map(|(o, _)| o).collect();
        assert_eq!(objects, vec!["o1:k=1", "o2:k=2"]);
    }

    #[test]
    fn test_timestamp_column_first() {
        let endpoint = two_target_endpoint();
        let mut header = HeaderTracker::new();
        let clock = MockClock::new(1_700_000_000);

        let row = collect_row(&two_targets(), &endpoint, &mut header, Some(&clock)).expect("row");

        assert_eq!(row.to_string(), "2023-11-14T22:13:20Z,1,2,hi");
        assert_eq!(header.header_line(), "timestamp,A1@x,A1@y,A2");
    }

    #[test]
    fn test_timestamp_label_not_repeated_after_freeze() {
        let endpoint = two_target_endpoint();
        let mut header = HeaderTracker::new();
        let clock = MockClock::new(0);

        collect_row(&two_targets(), &endpoint, &mut header, Some(&clock)).expect("row");
        header.freeze();
        let second =
            collect_row(&two_targets(), &endpoint, &mut header, Some(&clock)).expect("row");

        assert_eq!(second.len(), header.current_header().len());
        assert_eq!(header.header_line(), "timestamp,A1@x,A1@y,A2");
    }

    #[test]
    fn test_failure_in_second_target_yields_no_row() {
        let endpoint = MockEndpoint::new()
            .with_attribute("o1:k=1", "A1", 1_i64)
            .with_failure("o2:k=2", "A2", MockFailure::Transport);
        let mut header = HeaderTracker::new();

        let result = collect_row(&two_targets(), &endpoint, &mut header, None);

        assert!(result.is_err());
        assert_eq!(endpoint.calls().len(), 2);
    }

    #[test]
    fn test_no_targets_empty_row() {
        let endpoint = MockEndpoint::new();
        let mut header = HeaderTracker::new();

        let row = collect_row(&[], &endpoint, &mut header, None).expect("row");

        assert!(row.is_empty());
        assert_eq!(row.to_string(), "");
    }
}
