//! Recap Core Library
//!
//! Drives one analysis request at a time against a remote video summary
//! service and turns the structured summary it returns into a markdown
//! document.

pub mod backend;
pub mod controller;
pub mod download;
pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used items at crate root
pub use backend::{AnalysisBackend, BackendConfig, HttpBackend};
pub use controller::{
    BackendStatus, PendingRequest, RequestController, RequestSnapshot, RequestState, Resolution,
};
pub use download::{DownloadSink, FileDownloadSink, offer_document};
pub use error::{RecapError, Result, TransportError};
pub use format::{SummaryDocument, render_summary_document, suggested_filename};
pub use types::{
    AnalysisRequest, Chapter, HealthReport, KeyPoint, ProcessResponse, StructuredSummary,
    SummaryResult, Terminology, VideoInfo,
};
