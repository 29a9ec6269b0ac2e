//! # prmerge-core
//!
//! Core library for prmerge: configuration, the label filter, the
//! pagination driver and the fetch/squash/commit merge pipeline.

pub mod config;
pub mod error;
pub mod executor;
pub mod label;
pub mod pagination;
pub mod pipeline;
pub mod policy;
pub mod ref_name;

pub use config::{AzureSettings, Config, GitHubSettings, PartialConfig};
pub use error::{Error, Result};
pub use executor::{GitMerger, MergeRecord, MergeRequest, MergeStep, Merger};
pub use label::has_label;
pub use pagination::PageCursor;
pub use pipeline::{MergeReport, Progress, Silent, run};
pub use policy::{Settled, StatusPolicy};
pub use ref_name::RefName;
