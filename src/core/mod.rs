pub mod lister;
pub mod output;

pub use crate::domain::model::{Listing, ListingEntry, RunSummary, SecretOutcome, ShowEntry};
pub use crate::domain::ports::{ConfigProvider, SecretSource};
pub use crate::utils::error::Result;
