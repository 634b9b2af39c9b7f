//! Source documents: URL policy, fetching and excerpt selection.

mod error;
mod excerpt;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod policy;


pub use error::SourceError;
pub use excerpt::{ExcerptRequest, SourceExcerpt, SourceExcerpter};
pub use fetcher::{DocumentFetcher, HttpDocumentFetcher, extract_paragraphs};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDocumentFetcher;
pub use policy::SourcePolicy;
