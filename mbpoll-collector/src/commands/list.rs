//! List command.
//!
//! Prints every object name known to the endpoint, optionally restricted to
//! a pattern, one per line. Names sort by domain, then `type` key value,
//! then canonical key list.

use std::collections::BTreeSet;

use mbpoll_endpoint::{EndpointError, ManagementEndpoint, ObjectName};

use crate::io::OutputSink;

use super::CommandResult;

/// Query names and return them in listing order.
///
/// Names that differ only in key order are the same object and appear once.
pub fn list_names<E>(
    endpoint: &E,
    pattern: Option<&ObjectName>,
) -> Result<Vec<String>, EndpointError>
where
    E: ManagementEndpoint + ?Sized,
{
    let names: BTreeSet<ObjectName> = endpoint.query_names(pattern)?.into_iter().collect();
    Ok(names.iter().map(ToString::to_string).collect())
}

/// Execute the list command, returning the number of names written.
pub fn execute_list<E, O>(
    endpoint: &E,
    pattern: Option<&ObjectName>,
    sink: &mut O,
) -> CommandResult<usize>
where
    E: ManagementEndpoint + ?Sized,
    O: OutputSink + ?Sized,
{
    let names = list_names(endpoint, pattern)?;
    for name in &names {
        sink.write_row(name)?;
    }
    log::info!("listed {} object name(s)", names.len());
    Ok(names.len())
}
