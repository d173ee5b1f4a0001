//! DocRank Pipeline Library
//!
//! Loads a document collection, structures each document into sections,
//! embeds them and writes a persona-driven relevance report built on
//! `docrank-core`.

pub mod config;
pub mod error;
pub mod input;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use config::{EmbedderBackend, Settings, SettingsOverrides};
pub use error::{PipelineError, PipelineResult};
pub use input::Collection;
pub use pipeline::Pipeline;
pub use report::{Report, ReportBuilder};
