pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool, LISTING_FOLD_COLLATION};
pub use fixtures::{DemoListings, SeedResult, VerificationResult};
pub use repositories::{
    InMemoryListingRepository, ListingRepository, RepositoryError, SqlListingRepository,
};
