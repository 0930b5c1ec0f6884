use crate::schema::{Report, ReportKind};
use log::trace;

/// Returns the first report, in collection order, whose name contains `fragment`.
///
/// Matching is by substring because the source appends qualifiers to the
/// canonical names. An empty collection simply yields `None`.
pub fn find_report<'a>(reports: &'a [Report], fragment: &str) -> Option<&'a Report> {
    let found = reports
        .iter()
        .find(|report| report.name().is_some_and(|name| name.contains(fragment)));

    trace!(
        "Report lookup for '{}' across {} reports: {}",
        fragment,
        reports.len(),
        if found.is_some() { "found" } else { "absent" }
    );

    found
}

pub fn find_kind(reports: &[Report], kind: ReportKind) -> Option<&Report> {
    find_report(reports, kind.label())
}
