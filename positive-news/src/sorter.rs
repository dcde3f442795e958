use crate::types::CuratedRecord;
use std::cmp::Reverse;

/// Order the full collection for display: new records first, then newest timestamp first.
///
/// Timestamps compare as strings. The sort is stable.
pub fn sort_records(records: &mut [CuratedRecord]) {
    records.sort_by(|a, b| {
        (Reverse(a.is_new), Reverse(a.timestamp.as_str()))
            .cmp(&(Reverse(b.is_new), Reverse(b.timestamp.as_str())))
    });
}
