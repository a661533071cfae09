//! Pattern Annotation Store.
//!
//! Holds the dark pattern records of one conversation. Severity counts are
//! derived from the live record list on every call.

mod location;

pub use location::{display_location, parse_display_location};

use crate::error::ReviewError;
use crate::steps::StepStore;
use biasguard_config::CatalogConfig;
use biasguard_protocol::{DarkPatternRecord, PatternId, PatternType, Severity};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

/// Record counts per severity.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct SeveritySummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeveritySummary {
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Ordered set of dark pattern records plus the reviewer's selection.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    records: Vec<DarkPatternRecord>,
    selected: Option<PatternId>,
    catalog: CatalogConfig,
}

/// Stores compare by their records; selection and policy are session state.
impl PartialEq for AnnotationStore {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl AnnotationStore {
    pub fn new(catalog: CatalogConfig) -> Self {
        Self {
            records: Vec::new(),
            selected: None,
            catalog,
        }
    }

    /// Rebuild a store from exported records without location checks.
    ///
    /// Used for export round-trips; sessions re-validate locations on import.
    pub fn from_records(
        records: Vec<DarkPatternRecord>,
        catalog: CatalogConfig,
    ) -> Result<Self, ReviewError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(ReviewError::DuplicatePattern(record.id));
            }
            check_pattern_type(&record.pattern_type, &catalog)?;
        }
        Ok(Self {
            records,
            selected: None,
            catalog,
        })
    }

    /// Add a record anchored to existing steps.
    pub fn add(
        &mut self,
        record: DarkPatternRecord,
        steps: &StepStore,
    ) -> Result<PatternId, ReviewError> {
        self.check_new(&record, steps)?;
        let id = record.id;
        debug!(
            "adding pattern (id={}, type={}, severity={})",
            id, record.pattern_type, record.severity
        );
        self.records.push(record);
        Ok(id)
    }

    /// Add several records at once; nothing is added if any record fails.
    pub fn extend(
        &mut self,
        records: Vec<DarkPatternRecord>,
        steps: &StepStore,
    ) -> Result<usize, ReviewError> {
        let mut incoming = HashSet::new();
        for record in &records {
            self.check_new(record, steps)?;
            if !incoming.insert(record.id) {
                return Err(ReviewError::DuplicatePattern(record.id));
            }
        }
        let added = records.len();
        self.records.extend(records);
        debug!("imported patterns (count={added})");
        Ok(added)
    }

    /// Replace the reviewer note of a record.
    pub fn update_note(&mut self, id: PatternId, note: impl Into<String>) -> Result<(), ReviewError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ReviewError::NotFound(id))?;
        record.note = note.into();
        debug!("updated pattern note (id={}, note_len={})", id, record.note.len());
        Ok(())
    }

    /// Delete a record, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: PatternId) -> Result<DarkPatternRecord, ReviewError> {
        let position = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(ReviewError::NotFound(id))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!("removing pattern (id={id})");
        Ok(self.records.remove(position))
    }

    /// Records in insertion order.
    pub fn list(&self) -> &[DarkPatternRecord] {
        &self.records
    }

    pub fn get(&self, id: PatternId) -> Option<&DarkPatternRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counts for each severity, zero where no record exists.
    pub fn summary_by_severity(&self) -> SeveritySummary {
        self.records
            .iter()
            .fold(SeveritySummary::default(), |mut summary, record| {
                match record.severity {
                    Severity::Low => summary.low += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::High => summary.high += 1,
                }
                summary
            })
    }

    /// Records whose location touches the given step.
    pub fn for_step(&self, step_id: &str) -> Vec<&DarkPatternRecord> {
        self.records
            .iter()
            .filter(|record| record.location.touches(step_id))
            .collect()
    }

    /// Highlight a record.
    pub fn select(&mut self, id: PatternId) -> Result<(), ReviewError> {
        if self.get(id).is_none() {
            return Err(ReviewError::NotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&DarkPatternRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    fn check_new(&self, record: &DarkPatternRecord, steps: &StepStore) -> Result<(), ReviewError> {
        if self.get(record.id).is_some() {
            return Err(ReviewError::DuplicatePattern(record.id));
        }
        check_pattern_type(&record.pattern_type, &self.catalog)?;
        location::validate_location(&record.location, steps)
    }
}

fn check_pattern_type(pattern_type: &PatternType, catalog: &CatalogConfig) -> Result<(), ReviewError> {
    let PatternType::Custom(label) = pattern_type else {
        return Ok(());
    };
    if label.trim().is_empty() {
        return Err(ReviewError::InvalidPattern(
            "custom pattern label is empty".to_string(),
        ));
    }
    if !catalog.allow_custom {
        return Err(ReviewError::InvalidPattern(format!(
            "custom pattern {label:?} is not allowed by the catalog policy"
        )));
    }
    // Labels are stored as text; a custom label must read back as itself.
    if PatternType::parse(label) != *pattern_type {
        return Err(ReviewError::InvalidPattern(format!(
            "custom pattern {label:?} is padded or names a catalog entry ({})",
            PatternType::parse(label)
        )));
    }
    Ok(())
}
