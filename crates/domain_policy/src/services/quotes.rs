use std::sync::Arc;

use tracing::{debug, info};

use core_kernel::{QuoteId, SharedClock};

use crate::error::PolicyError;
use crate::ports::{ProductRepository, QuoteRepository};
use crate::quote::{self, Quote, QuoteInput};

/// Prices quotes against the catalog and stores them
#[derive(Clone)]
pub struct QuoteService {
    products: Arc<dyn ProductRepository>,
    quotes: Arc<dyn QuoteRepository>,
    clock: SharedClock,
}

impl std::fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService").field("clock", &self.clock).finish_non_exhaustive()
    }
}

impl QuoteService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        quotes: Arc<dyn QuoteRepository>,
        clock: SharedClock,
    ) -> Self {
        Self { products, quotes, clock }
    }

    /// Prices and stores a quote
    ///
    /// # Errors
    ///
    /// * `Validation` - malformed input, or coverage or term outside the product
    /// * `NotFound` - no product has the requested slug
    pub async fn price(&self, input: &QuoteInput) -> Result<Quote, PolicyError> {
        input.validate()?;

        let product = self.products.get_by_slug(&input.product_slug).await.map_err(|err| {
            if err.is_not_found() {
                PolicyError::not_found(format!("product {}", input.product_slug))
            } else {
                err.into()
            }
        })?;

        let quote = quote::price(&product, input, self.clock.now())?;
        self.quotes.create(&quote).await?;

        info!(
            quote_id = %quote.id,
            product = %quote.product_slug,
            coverage = quote.coverage_amount,
            premium = %quote.monthly_premium,
            "quote priced"
        );
        Ok(quote)
    }

    pub async fn get(&self, id: QuoteId) -> Result<Quote, PolicyError> {
        debug!(quote_id = %id, "loading quote");
        Ok(self.quotes.get(id).await?)
    }
}
