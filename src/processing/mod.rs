//! Document pipeline: loading, categorization, storage and folder organization.

mod documents;
mod mappers;
mod organize;
mod service;
pub mod types;

pub use documents::{SUPPORTED_EXTENSIONS, load_documents};
pub use organize::{folder_name, organize};
pub use service::CategorizationService;
pub use types::{
    CategorizationReport, CategorizedDocument, Document, Mode, PipelineError, SearchHit,
};
