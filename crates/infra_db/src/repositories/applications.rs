use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use core_kernel::{ApplicationId, MonthlyPremium, PortError, ProductId, QuoteId};
use domain_policy::{Applicant, Application, ApplicationRepository, ApplicationStatus};

use crate::error::port_error;
use crate::store::{bind_count, parse_column, unsigned, PostgresStore};

const ENTITY: &str = "Application";

const SELECT: &str = r#"
    SELECT id, quote_id, product_id, product_slug, coverage_amount, term_years,
           monthly_premium, applicant, status, created_at, updated_at, submitted_at
    FROM applications
"#;

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    quote_id: Uuid,
    product_id: Uuid,
    product_slug: String,
    coverage_amount: i64,
    term_years: i32,
    monthly_premium: Decimal,
    applicant: Json<Applicant>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = PortError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: ApplicationId::from_uuid(row.id),
            quote_id: QuoteId::from_uuid(row.quote_id),
            product_id: ProductId::from_uuid(row.product_id),
            product_slug: row.product_slug,
            coverage_amount: row.coverage_amount,
            term_years: unsigned("term_years", row.term_years)?,
            monthly_premium: MonthlyPremium::new(row.monthly_premium),
            applicant: row.applicant.0,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            submitted_at: row.submitted_at,
        })
    }
}

#[async_trait]
impl ApplicationRepository for PostgresStore {
    async fn create(&self, application: &Application) -> Result<(), PortError> {
        self.bounded("applications.create", async {
            sqlx::query(
                r#"
                INSERT INTO applications (
                    id, quote_id, product_id, product_slug, coverage_amount, term_years,
                    monthly_premium, applicant, status, created_at, updated_at, submitted_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(application.id.as_uuid())
            .bind(application.quote_id.as_uuid())
            .bind(application.product_id.as_uuid())
            .bind(&application.product_slug)
            .bind(application.coverage_amount)
            .bind(application.term_years as i32)
            .bind(application.monthly_premium.amount())
            .bind(Json(&application.applicant))
            .bind(application.status.as_str())
            .bind(application.created_at)
            .bind(application.updated_at)
            .bind(application.submitted_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: ApplicationId) -> Result<Application, PortError> {
        self.bounded("applications.get", async {
            sqlx::query_as::<_, ApplicationRow>(&format!("{SELECT} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, id))?
                .try_into()
        })
        .await
    }

    async fn update(&self, application: &Application) -> Result<(), PortError> {
        self.bounded("applications.update", async {
            let result = sqlx::query(
                r#"
                UPDATE applications
                SET applicant = $2, status = $3, updated_at = $4, submitted_at = $5
                WHERE id = $1
                "#,
            )
            .bind(application.id.as_uuid())
            .bind(Json(&application.applicant))
            .bind(application.status.as_str())
            .bind(application.updated_at)
            .bind(application.submitted_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            if result.rows_affected() == 0 {
                return Err(PortError::not_found(ENTITY, application.id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<Application>, PortError> {
        self.bounded("applications.find_by_status", async {
            let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
                "{SELECT} WHERE status = $1 ORDER BY created_at ASC LIMIT $2"
            ))
            .bind(status.as_str())
            .bind(bind_count(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            rows.into_iter().map(Application::try_from).collect()
        })
        .await
    }
}
