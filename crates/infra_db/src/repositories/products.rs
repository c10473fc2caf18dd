use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{PortError, ProductId};
use domain_policy::{Product, ProductRepository};

use crate::error::port_error;
use crate::store::{unsigned, PostgresStore};

const ENTITY: &str = "Product";

const COLUMNS: &str = "id, slug, name, term_years, min_coverage, max_coverage, base_rate";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    slug: String,
    name: String,
    term_years: i32,
    min_coverage: i64,
    max_coverage: i64,
    base_rate: Decimal,
}

impl TryFrom<ProductRow> for Product {
    type Error = PortError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.id),
            slug: row.slug,
            name: row.name,
            term_years: unsigned("term_years", row.term_years)?,
            min_coverage: row.min_coverage,
            max_coverage: row.max_coverage,
            base_rate: row.base_rate,
        })
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn list(&self) -> Result<Vec<Product>, PortError> {
        self.bounded("products.list", async {
            let rows = sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {COLUMNS} FROM products ORDER BY slug"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(ENTITY, e))?;

            rows.into_iter().map(Product::try_from).collect()
        })
        .await
    }

    async fn get(&self, id: ProductId) -> Result<Product, PortError> {
        self.bounded("products.get", async {
            sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, id))?
                .try_into()
        })
        .await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Product, PortError> {
        self.bounded("products.get_by_slug", async {
            sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .ok_or_else(|| PortError::not_found(ENTITY, slug))?
                .try_into()
        })
        .await
    }

    async fn upsert_by_slug(&self, product: &Product) -> Result<Product, PortError> {
        let stored: Product = self
            .bounded("products.upsert", async {
                sqlx::query_as::<_, ProductRow>(&format!(
                    r#"
                    INSERT INTO products (id, slug, name, term_years, min_coverage, max_coverage, base_rate)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (slug) DO UPDATE SET
                        name = EXCLUDED.name,
                        term_years = EXCLUDED.term_years,
                        min_coverage = EXCLUDED.min_coverage,
                        max_coverage = EXCLUDED.max_coverage,
                        base_rate = EXCLUDED.base_rate,
                        updated_at = now()
                    RETURNING {COLUMNS}
                    "#
                ))
                .bind(product.id.as_uuid())
                .bind(&product.slug)
                .bind(&product.name)
                .bind(product.term_years as i32)
                .bind(product.min_coverage)
                .bind(product.max_coverage)
                .bind(product.base_rate)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| port_error(ENTITY, e))?
                .try_into()
            })
            .await?;

        debug!(slug = %stored.slug, product_id = %stored.id, "product upserted");
        Ok(stored)
    }
}
