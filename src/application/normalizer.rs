// Normalizer - raw batch to ordered canonical views
use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::domain::machine::{MachineView, device_ordinal};
use crate::domain::reading::RawBatch;

/// Map a raw batch into the ordered machine views for the monitored range.
///
/// Filters to readings whose device ordinal falls in `range`, deduplicates by
/// machine id keeping the first occurrence in input order (the source emits
/// most-recent first), and sorts ascending by ordinal. Pure function of its
/// inputs; output never exceeds the input length.
pub fn normalize(batch: &RawBatch, range: &RangeInclusive<u32>) -> Vec<MachineView> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for reading in &batch.data {
        let machine_id = &reading.data.machine_id;
        let Some(ordinal) = device_ordinal(machine_id) else {
            continue;
        };
        if !range.contains(&ordinal) {
            continue;
        }
        if !seen.insert(machine_id.clone()) {
            continue;
        }
        selected.push((ordinal, reading));
    }

    selected.sort_by_key(|(ordinal, _)| *ordinal);

    selected
        .into_iter()
        .map(|(_, reading)| MachineView::from_reading(reading))
        .collect()
}
