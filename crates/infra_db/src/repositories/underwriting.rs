use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use core_kernel::{ApplicationId, PortError, UnderwritingCaseId};
use domain_policy::{RiskFactors, RiskScore, UnderwritingCase, UnderwritingRepository};

use crate::error::port_error;
use crate::store::{bind_count, parse_column, unsigned, PostgresStore};

const ENTITY: &str = "UnderwritingCase";

const SELECT: &str = r#"
    SELECT id, application_id, risk_factors, risk_score, risk_flags, recommended,
           decision, method, decided_by, reason, created_at, updated_at, decided_at
    FROM underwriting_cases
"#;

#[derive(Debug, sqlx::FromRow)]
struct CaseRow {
    id: Uuid,
    application_id: Uuid,
    risk_factors: Json<RiskFactors>,
    risk_score: i32,
    risk_flags: Vec<String>,
    recommended: String,
    decision: String,
    method: String,
    decided_by: String,
    reason: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<CaseRow> for UnderwritingCase {
    type Error = PortError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        Ok(UnderwritingCase {
            id: UnderwritingCaseId::from_uuid(row.id),
            application_id: ApplicationId::from_uuid(row.application_id),
            risk_factors: row.risk_factors.0,
            risk_score: RiskScore {
                score: unsigned("risk_score", row.risk_score)?,
                flags: row.risk_flags,
                recommended: parse_column("recommended", &row.recommended)?,
            },
            decision: parse_column("decision", &row.decision)?,
            method: parse_column("method", &row.method)?,
            decided_by: row.decided_by,
            reason: row.reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            decided_at: row.decided_at,
        })
    }
}

#[async_trait]
impl UnderwritingRepository for PostgresStore {
    async fn create(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        self.bounded("underwriting.create", async {
            sqlx::query(
                r#"
                INSERT INTO underwriting_cases (
                    id, application_id, risk_factors, risk_score, risk_flags, recommended,
                    decision, method, decided_by, reason, created_at, updated_at, decided_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(case.id.as_uuid())
            .bind(case.application_id.as_uuid())
            .bind(Json(&case.risk_factors))
            .bind(case.risk_score.score as i32)
            .bind(&case.risk_score.flags)
            .bind(case.risk_score.recommended.as_str())
            .bind(case.decision.as_str())
            .bind(case.method.as_str())
            .bind(&case.decided_by)
            .bind(&case.reason)
            .bind(case.created_at)
            .bind(case.updated_at)
            .bind(case.decided_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: UnderwritingCaseId) -> Result<UnderwritingCase, PortError> {
        self.bounded("underwriting.get", async {
            sqlx::query_as::<_, CaseRow>(&format!("{SELECT} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, id))?
                .try_into()
        })
        .await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PortError> {
        self.bounded("underwriting.get_by_application", async {
            sqlx::query_as::<_, CaseRow>(&format!("{SELECT} WHERE application_id = $1"))
                .bind(application_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, application_id))?
                .try_into()
        })
        .await
    }

    async fn update(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        self.bounded("underwriting.update", async {
            let result = sqlx::query(
                r#"
                UPDATE underwriting_cases
                SET decision = $2, method = $3, decided_by = $4, reason = $5,
                    updated_at = $6, decided_at = $7
                WHERE id = $1
                "#,
            )
            .bind(case.id.as_uuid())
            .bind(case.decision.as_str())
            .bind(case.method.as_str())
            .bind(&case.decided_by)
            .bind(&case.reason)
            .bind(case.updated_at)
            .bind(case.decided_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            if result.rows_affected() == 0 {
                return Err(PortError::not_found(ENTITY, case.id));
            }
            Ok(())
        })
        .await
    }

    async fn find_referred(&self, limit: usize) -> Result<Vec<UnderwritingCase>, PortError> {
        self.bounded("underwriting.find_referred", async {
            let rows = sqlx::query_as::<_, CaseRow>(&format!(
                "{SELECT} WHERE decision = 'referred' ORDER BY created_at ASC LIMIT $1"
            ))
            .bind(bind_count(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            rows.into_iter().map(UnderwritingCase::try_from).collect()
        })
        .await
    }
}
