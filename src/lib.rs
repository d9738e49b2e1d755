pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{build_submitter, HttpReferenceSource, LocalReferenceSource, SubmitStrategy};
pub use crate::config::IntakeConfig;
pub use crate::core::{
    loader::{DataLayout, ReferenceDataLoader},
    schema::FormSchema,
    FormEvent, FormSession, IntakeEngine, IntakeReport, SessionOptions,
};
pub use crate::utils::error::{IntakeError, Result, SubmitError};
