//! Exporter: JSON and CSV renditions of the annotation store.
//!
//! Record payloads are a pure function of store contents. The only
//! time-dependent value is `metadata.generated_at`, kept outside the record
//! list and omitted entirely when disabled.

use crate::annotations::AnnotationStore;
use crate::error::ReviewError;
use crate::steps::StepStore;
use biasguard_config::{CatalogConfig, ExportConfig};
use biasguard_protocol::{
    ANNOTATION_EXPORT_FORMAT, ANNOTATION_EXPORT_VERSION, AnnotationExport,
};
use chrono::Utc;
use csv::Writer;
use log::{debug, info};

/// Fixed CSV column order.
pub const CSV_HEADER: [&str; 6] = [
    "id",
    "patternType",
    "severity",
    "location",
    "description",
    "note",
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Build the export document for the current store contents.
    ///
    /// Steps are embedded only when `include_steps` is set; otherwise any
    /// steps passed in are left out.
    pub fn document(&self, store: &AnnotationStore, steps: Option<&StepStore>) -> AnnotationExport {
        let generated_at = self.config.include_generated_at.then(Utc::now);
        let steps = steps
            .filter(|_| self.config.include_steps)
            .map(|steps| steps.steps().to_vec());
        AnnotationExport::new(store.list().to_vec(), steps, generated_at)
    }

    /// Serialize the records as a JSON document.
    pub fn to_json(
        &self,
        store: &AnnotationStore,
        steps: Option<&StepStore>,
    ) -> Result<String, ReviewError> {
        let document = self.document(store, steps);
        let output = if self.config.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        info!(
            "exported annotations (format=json, patterns={}, steps={})",
            document.patterns.len(),
            document.steps.as_ref().map_or(0, Vec::len)
        );
        Ok(output)
    }

    /// One row per record under a fixed header.
    pub fn to_csv(&self, store: &AnnotationStore) -> Result<String, ReviewError> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(CSV_HEADER)?;
        for record in store.list() {
            wtr.write_record([
                record.id.to_string().as_str(),
                record.pattern_type.label(),
                record.severity.as_str(),
                record.location.to_id_string().as_str(),
                record.description.as_str(),
                record.note.as_str(),
            ])?;
        }
        let data = wtr
            .into_inner()
            .map_err(|err| ReviewError::Export(err.to_string()))?;
        info!("exported annotations (format=csv, patterns={})", store.len());
        String::from_utf8(data).map_err(|err| ReviewError::Export(err.to_string()))
    }

    /// Parse and version-check an export document.
    pub fn parse_document(json: &str) -> Result<AnnotationExport, ReviewError> {
        let document: AnnotationExport = serde_json::from_str(json)?;
        if document.format != ANNOTATION_EXPORT_FORMAT {
            return Err(ReviewError::UnsupportedExportFormat(document.format));
        }
        if document.version != ANNOTATION_EXPORT_VERSION {
            return Err(ReviewError::UnsupportedExportVersion(document.version));
        }
        debug!(
            "parsed export document (patterns={}, has_steps={})",
            document.patterns.len(),
            document.steps.is_some()
        );
        Ok(document)
    }

    /// Rebuild an annotation store from a JSON export.
    pub fn from_json(json: &str, catalog: CatalogConfig) -> Result<AnnotationStore, ReviewError> {
        let document = Self::parse_document(json)?;
        AnnotationStore::from_records(document.patterns, catalog)
    }
}
