use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use core_kernel::{ApplicationId, MonthlyPremium, OfferId, PortError};
use domain_policy::{Offer, OfferRepository};

use crate::error::port_error;
use crate::store::{bind_count, parse_column, unsigned, PostgresStore};

const ENTITY: &str = "Offer";

const SELECT: &str = r#"
    SELECT id, application_id, product_slug, coverage_amount, term_years, monthly_premium,
           status, created_at, expires_at, accepted_at, declined_at
    FROM offers
"#;

#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    application_id: Uuid,
    product_slug: String,
    coverage_amount: i64,
    term_years: i32,
    monthly_premium: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = PortError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        Ok(Offer {
            id: OfferId::from_uuid(row.id),
            application_id: ApplicationId::from_uuid(row.application_id),
            product_slug: row.product_slug,
            coverage_amount: row.coverage_amount,
            term_years: unsigned("term_years", row.term_years)?,
            monthly_premium: MonthlyPremium::new(row.monthly_premium),
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
            declined_at: row.declined_at,
        })
    }
}

#[async_trait]
impl OfferRepository for PostgresStore {
    async fn create(&self, offer: &Offer) -> Result<(), PortError> {
        self.bounded("offers.create", async {
            sqlx::query(
                r#"
                INSERT INTO offers (
                    id, application_id, product_slug, coverage_amount, term_years, monthly_premium,
                    status, created_at, expires_at, accepted_at, declined_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(offer.id.as_uuid())
            .bind(offer.application_id.as_uuid())
            .bind(&offer.product_slug)
            .bind(offer.coverage_amount)
            .bind(offer.term_years as i32)
            .bind(offer.monthly_premium.amount())
            .bind(offer.status.as_str())
            .bind(offer.created_at)
            .bind(offer.expires_at)
            .bind(offer.accepted_at)
            .bind(offer.declined_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: OfferId) -> Result<Offer, PortError> {
        self.bounded("offers.get", async {
            sqlx::query_as::<_, OfferRow>(&format!("{SELECT} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, id))?
                .try_into()
        })
        .await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Offer, PortError> {
        self.bounded("offers.get_by_application", async {
            sqlx::query_as::<_, OfferRow>(&format!("{SELECT} WHERE application_id = $1"))
                .bind(application_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, application_id))?
                .try_into()
        })
        .await
    }

    async fn update(&self, offer: &Offer) -> Result<(), PortError> {
        self.bounded("offers.update", async {
            let result = sqlx::query(
                "UPDATE offers SET status = $2, accepted_at = $3, declined_at = $4 WHERE id = $1",
            )
            .bind(offer.id.as_uuid())
            .bind(offer.status.as_str())
            .bind(offer.accepted_at)
            .bind(offer.declined_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            if result.rows_affected() == 0 {
                return Err(PortError::not_found(ENTITY, offer.id));
            }
            Ok(())
        })
        .await
    }

    async fn find_accepted(&self, limit: usize) -> Result<Vec<Offer>, PortError> {
        self.bounded("offers.find_accepted", async {
            let rows = sqlx::query_as::<_, OfferRow>(&format!(
                "{SELECT} WHERE status = 'accepted' ORDER BY accepted_at ASC NULLS FIRST, created_at ASC LIMIT $1"
            ))
            .bind(bind_count(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            rows.into_iter().map(Offer::try_from).collect()
        })
        .await
    }

    async fn expire_offers(&self, before: DateTime<Utc>) -> Result<u64, PortError> {
        self.bounded("offers.expire", async {
            let result = sqlx::query(
                "UPDATE offers SET status = 'expired' WHERE status = 'pending' AND expires_at < $1",
            )
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(result.rows_affected())
        })
        .await
    }
}
