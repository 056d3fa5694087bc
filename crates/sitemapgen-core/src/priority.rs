//! Partition priorities.
//!
//! Priorities are resolved from an immutable [`PriorityTable`] built once per run:
//! built-in defaults for the standard wiki namespaces, overlaid with configured
//! overrides (clamped into `[0.0, 1.0]`). Partitions absent from the table fall
//! back to one of two constants depending on whether they are subject-like or
//! talk-like.

use crate::{Error, PartitionId, Result};
use std::collections::BTreeMap;

/// Fallback for subject-like partitions without an entry.
pub const SUBJECT_FALLBACK: &str = "0.5";
/// Fallback for talk-like partitions without an entry.
pub const TALK_FALLBACK: &str = "0.1";

/// Built-in priorities for the standard namespaces.
const STANDARD_PRIORITIES: &[(i32, &str)] = &[
    (0, "1.0"),   // main
    (1, "0.1"),   // talk
    (2, "0.5"),   // user
    (3, "0.1"),   // user talk
    (4, "0.5"),   // project
    (5, "0.1"),   // project talk
    (6, "0.5"),   // file
    (7, "0.1"),   // file talk
    (8, "0.0"),   // interface messages
    (9, "0.1"),   // interface messages talk
    (10, "0.0"),  // template
    (11, "0.1"),  // template talk
    (12, "0.5"),  // help
    (13, "0.1"),  // help talk
    (14, "0.5"),  // category
    (15, "0.1"),  // category talk
];

/// Immutable partition → priority mapping.
#[derive(Debug, Clone)]
pub struct PriorityTable {
    entries: BTreeMap<PartitionId, String>,
}

impl PriorityTable {
    /// Table with only the built-in standard namespace priorities.
    #[must_use]
    pub fn standard() -> Self {
        let entries = STANDARD_PRIORITIES
            .iter()
            .map(|(ns, p)| (PartitionId(*ns), (*p).to_string()))
            .collect();
        Self { entries }
    }

    /// Standard table overlaid with `overrides`.
    ///
    /// Values above 1.0 become `"1.0"`, values below 0.0 become `"0.0"`; in-range
    /// values are kept exactly as written. Non-numeric values are rejected.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::standard();
        for (key, value) in overrides {
            let partition = key.parse::<PartitionId>()?;
            table.entries.insert(partition, clamp_priority(value)?);
        }
        Ok(table)
    }

    /// Resolve the priority for a partition.
    #[must_use]
    pub fn priority(&self, partition: PartitionId) -> &str {
        self.entries
            .get(&partition)
            .map_or_else(|| Self::guess(partition), String::as_str)
    }

    const fn guess(partition: PartitionId) -> &'static str {
        if partition.is_subject() {
            SUBJECT_FALLBACK
        } else {
            TALK_FALLBACK
        }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Clamp a priority string into `[0.0, 1.0]`.
pub fn clamp_priority(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| Error::Config(format!("priority is not a number: {value:?}")))?;
    if parsed.is_nan() {
        return Err(Error::Config(format!("priority is not a number: {value:?}")));
    }
    Ok(if parsed > 1.0 {
        "1.0".to_string()
    } else if parsed < 0.0 {
        "0.0".to_string()
    } else {
        trimmed.to_string()
    })
}
