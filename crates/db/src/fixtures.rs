use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Rows the demo catalogue must contain after [`DemoListings::load`].
const DEMO_CONTRACT: &[DemoListingContract] = &[
    DemoListingContract { id: 1, city: "Lyon", real_estate_type: "maison" },
    DemoListingContract { id: 2, city: "Lyon", real_estate_type: "appartement" },
    DemoListingContract { id: 3, city: "Lyon", real_estate_type: "appartement" },
    DemoListingContract { id: 4, city: "Paris", real_estate_type: "studio" },
    DemoListingContract { id: 5, city: "Paris", real_estate_type: "appartement" },
    DemoListingContract { id: 6, city: "Nice", real_estate_type: "villa" },
    DemoListingContract { id: 7, city: "Nantes", real_estate_type: "maison" },
    DemoListingContract { id: 8, city: "Bordeaux", real_estate_type: "appartement" },
];

/// Deterministic demo catalogue used by `immo seed` and the end-to-end tests.
pub struct DemoListings;

impl DemoListings {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_listings.sql");

    /// Loads the catalogue. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult { listings_seeded: DEMO_CONTRACT.len() })
    }

    /// Checks that every demo row exists with its expected city and type.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(DEMO_CONTRACT.len());

        for contract in DEMO_CONTRACT {
            let row: Option<(String, String)> = sqlx::query_as(
                "SELECT department, real_estate_type FROM real_estate WHERE id = ?",
            )
            .bind(contract.id)
            .fetch_optional(pool)
            .await?;

            let present = row.is_some_and(|(city, real_estate_type)| {
                city == contract.city && real_estate_type == contract.real_estate_type
            });
            checks.push((contract.id, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug, Clone, Copy)]
struct DemoListingContract {
    id: i64,
    city: &'static str,
    real_estate_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub listings_seeded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    /// `(listing id, present with expected values)` per demo row.
    pub checks: Vec<(i64, bool)>,
}
