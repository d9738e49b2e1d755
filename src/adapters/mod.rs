// Adapters layer: concrete implementations of the domain ports (reference sources, submitters).

pub mod http;
pub mod local;
pub mod submit;

pub use http::HttpReferenceSource;
pub use local::LocalReferenceSource;
pub use submit::{build_submitter, SubmitStrategy};
