//! Conversation turn analysis and annotation engine for BiasGuard.
//!
//! This crate owns the step store, turn grouping, degradation metrics, risk
//! classification, dark pattern annotations, view filtering, and export used
//! by the SDK facade.

pub mod analysis;
pub mod annotations;
pub mod error;
pub mod export;
pub mod metrics;
pub mod risk;
pub mod session;
pub mod steps;
pub mod turns;
pub mod view;

pub use analysis::{
    AnalysisResult, ConversationSummary, DegradationFinding, StepSnapshot, TurnSnapshot, analyze,
};
/// Annotation store and legacy location helpers.
pub use annotations::{AnnotationStore, SeveritySummary, display_location, parse_display_location};
pub use error::ReviewError;
pub use export::{CSV_HEADER, Exporter};
pub use metrics::{DegradationMetrics, TurnDelta};
pub use risk::RiskClassifier;
pub use session::ReviewSession;
pub use steps::StepStore;
pub use turns::{Turn, TurnGrouping};
pub use view::{ViewController, ViewState};
