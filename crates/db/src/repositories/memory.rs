use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use immo_core::criteria::ListingFilter;
use immo_core::domain::listing::{Listing, ListingId};

use super::{ListingRepository, RepositoryError};

/// Listing store held in memory. Evaluates filters with [`ListingFilter::matches`], so it
/// returns the same rows as [`super::SqlListingRepository`] for ASCII data.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<Vec<Listing>>,
    unavailable: AtomicBool,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self { listings: RwLock::new(listings), unavailable: AtomicBool::new(false) }
    }

    /// Makes every subsequent call fail as if no connection could be acquired.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        self.ensure_available()?;
        let listings = self.listings.read().await;
        Ok(listings.iter().filter(|listing| filter.matches(listing)).cloned().collect())
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        self.ensure_available()?;
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|listing| listing.id == id).cloned())
    }
}
