pub mod cascade;
pub mod dropdown;
pub mod feedback;
pub mod intake;
pub mod loader;
pub mod rules;
pub mod schema;
pub mod session;
pub mod toggle;

pub use crate::domain::model::{FormPayload, ReferenceData};
pub use crate::domain::ports::{ReferenceSource, Submitter};
pub use crate::utils::error::Result;
pub use intake::{IntakeEngine, IntakeReport};
pub use session::{FormEvent, FormSession, SessionOptions};
