use async_trait::async_trait;
use thiserror::Error;

use immo_core::criteria::ListingFilter;
use immo_core::domain::listing::{Listing, ListingId};

pub mod listing;
pub mod memory;

pub use listing::SqlListingRepository;
pub use memory::InMemoryListingRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No connection could be acquired (timeout, closed pool, unreachable file).
    #[error("listing store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Read-only access to persisted listings.
///
/// Text criteria inside a [`ListingFilter`] are already case-folded; implementations compare
/// them literally against the case-folded column. An empty `Vec` is a successful result.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError>;

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Listing>, RepositoryError> {
        self.find(&ListingFilter::All).await
    }
}
