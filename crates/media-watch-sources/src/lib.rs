pub mod catalog;
pub mod error;
pub mod factory;
pub mod subtitles;
pub mod traits;

pub use catalog::{Catalog, CatalogProvider};
pub use error::SourceError;
pub use factory::{ProviderFactory, ProviderRegistry};
pub use subtitles::SubtitleFetcher;
pub use traits::ContentProvider;
