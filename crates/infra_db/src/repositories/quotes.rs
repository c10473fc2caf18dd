use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use core_kernel::{MonthlyPremium, PortError, ProductId, QuoteId};
use domain_policy::{Quote, QuoteRepository};

use crate::error::port_error;
use crate::store::{parse_column, unsigned, PostgresStore};

const ENTITY: &str = "Quote";

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    product_id: Uuid,
    product_slug: String,
    coverage_amount: i64,
    term_years: i32,
    monthly_premium: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = PortError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: QuoteId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            product_slug: row.product_slug,
            coverage_amount: row.coverage_amount,
            term_years: unsigned("term_years", row.term_years)?,
            monthly_premium: MonthlyPremium::new(row.monthly_premium),
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl QuoteRepository for PostgresStore {
    async fn create(&self, quote: &Quote) -> Result<(), PortError> {
        self.bounded("quotes.create", async {
            sqlx::query(
                r#"
                INSERT INTO quotes (
                    id, product_id, product_slug, coverage_amount, term_years,
                    monthly_premium, status, created_at, expires_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(quote.id.as_uuid())
            .bind(quote.product_id.as_uuid())
            .bind(&quote.product_slug)
            .bind(quote.coverage_amount)
            .bind(quote.term_years as i32)
            .bind(quote.monthly_premium.amount())
            .bind(quote.status.as_str())
            .bind(quote.created_at)
            .bind(quote.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: QuoteId) -> Result<Quote, PortError> {
        self.bounded("quotes.get", async {
            sqlx::query_as::<_, QuoteRow>(
                r#"
                SELECT id, product_id, product_slug, coverage_amount, term_years,
                       monthly_premium, status, created_at, expires_at
                FROM quotes
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?
            .ok_or_else(|| PortError::not_found(ENTITY, id))?
            .try_into()
        })
        .await
    }
}
