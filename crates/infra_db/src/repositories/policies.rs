use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{ApplicationId, MonthlyPremium, OfferId, PolicyId, PortError};
use domain_policy::{Applicant, Policy, PolicyFilter, PolicyRepository};

use crate::error::port_error;
use crate::store::{bind_count, parse_column, unsigned, PostgresStore};

const ENTITY: &str = "Policy";

const SELECT: &str = r#"
    SELECT id, number, application_id, offer_id, product_slug, coverage_amount, term_years,
           monthly_premium, insured, status, effective_date, expiry_date, issued_at
    FROM policies
"#;

/// Optional filters; a NULL parameter matches every row
const FILTER: &str = "($1::uuid IS NULL OR application_id = $1) AND ($2::text IS NULL OR status = $2)";

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    id: Uuid,
    number: String,
    application_id: Uuid,
    offer_id: Uuid,
    product_slug: String,
    coverage_amount: i64,
    term_years: i32,
    monthly_premium: Decimal,
    insured: Json<Applicant>,
    status: String,
    effective_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    issued_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = PortError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        Ok(Policy {
            id: PolicyId::from_uuid(row.id),
            number: row.number,
            application_id: ApplicationId::from_uuid(row.application_id),
            offer_id: OfferId::from_uuid(row.offer_id),
            product_slug: row.product_slug,
            coverage_amount: row.coverage_amount,
            term_years: unsigned("term_years", row.term_years)?,
            monthly_premium: MonthlyPremium::new(row.monthly_premium),
            insured: row.insured.0,
            status: parse_column("status", &row.status)?,
            effective_date: row.effective_date,
            expiry_date: row.expiry_date,
            issued_at: row.issued_at,
        })
    }
}

impl PostgresStore {
    async fn fetch_policy(&self, operation: &'static str, column: &str, key: Uuid) -> Result<Policy, PortError> {
        self.bounded(operation, async {
            sqlx::query_as::<_, PolicyRow>(&format!("{SELECT} WHERE {column} = $1"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, format!("{} {}", column, key)))?
                .try_into()
        })
        .await
    }
}

#[async_trait]
impl PolicyRepository for PostgresStore {
    async fn create(&self, policy: &Policy) -> Result<(), PortError> {
        self.bounded("policies.create", async {
            sqlx::query(
                r#"
                INSERT INTO policies (
                    id, number, application_id, offer_id, product_slug, coverage_amount, term_years,
                    monthly_premium, insured, status, effective_date, expiry_date, issued_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(policy.id.as_uuid())
            .bind(&policy.number)
            .bind(policy.application_id.as_uuid())
            .bind(policy.offer_id.as_uuid())
            .bind(&policy.product_slug)
            .bind(policy.coverage_amount)
            .bind(policy.term_years as i32)
            .bind(policy.monthly_premium.amount())
            .bind(Json(&policy.insured))
            .bind(policy.status.as_str())
            .bind(policy.effective_date)
            .bind(policy.expiry_date)
            .bind(policy.issued_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: PolicyId) -> Result<Policy, PortError> {
        self.fetch_policy("policies.get", "id", *id.as_uuid()).await
    }

    async fn get_by_number(&self, number: &str) -> Result<Policy, PortError> {
        self.bounded("policies.get_by_number", async {
            sqlx::query_as::<_, PolicyRow>(&format!("{SELECT} WHERE number = $1"))
                .bind(number)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, number))?
                .try_into()
        })
        .await
    }

    async fn get_by_offer(&self, offer_id: OfferId) -> Result<Policy, PortError> {
        self.fetch_policy("policies.get_by_offer", "offer_id", *offer_id.as_uuid()).await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Policy, PortError> {
        self.fetch_policy("policies.get_by_application", "application_id", *application_id.as_uuid())
            .await
    }

    async fn list(
        &self,
        filter: &PolicyFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Policy>, u64), PortError> {
        let application_id = filter.application_id.map(|id| *id.as_uuid());
        let status = filter.status.map(|s| s.as_str());

        self.bounded("policies.list", async {
            let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM policies WHERE {FILTER}"))
                .bind(application_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?;

            let rows = sqlx::query_as::<_, PolicyRow>(&format!(
                "{SELECT} WHERE {FILTER} ORDER BY issued_at DESC LIMIT $3 OFFSET $4"
            ))
            .bind(application_id)
            .bind(status)
            .bind(bind_count(limit))
            .bind(bind_count(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            let policies = rows.into_iter().map(Policy::try_from).collect::<Result<Vec<_>, _>>()?;
            Ok((policies, total.max(0) as u64))
        })
        .await
    }

    async fn next_policy_sequence(&self, year: i32) -> Result<u64, PortError> {
        let value: i64 = self
            .bounded("policies.next_sequence", async {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO policy_counters (year, last_value) VALUES ($1, 1)
                    ON CONFLICT (year) DO UPDATE SET last_value = policy_counters.last_value + 1
                    RETURNING last_value
                    "#,
                )
                .bind(year)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| port_error("PolicyCounter", e))
            })
            .await?;

        debug!(year, sequence = value, "policy sequence drawn");
        u64::try_from(value).map_err(|_| PortError::transformation(format!("negative policy sequence {}", value)))
    }
}
