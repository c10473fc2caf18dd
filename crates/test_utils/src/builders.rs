//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use rust_decimal::Decimal;

use core_kernel::ProductId;
use domain_policy::{Applicant, Product, QuoteInput};

use crate::fixtures::{ApplicantFixtures, ProductFixtures, QuoteFixtures};

/// Builder for applicants, starting from the standard applicant
pub struct ApplicantBuilder {
    applicant: Applicant,
}

impl Default for ApplicantBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicantBuilder {
    pub fn new() -> Self {
        Self {
            applicant: ApplicantFixtures::standard(),
        }
    }

    pub fn age(mut self, age: u32) -> Self {
        self.applicant.age = age;
        self
    }

    pub fn smoker(mut self, smoker: bool) -> Self {
        self.applicant.smoker = smoker;
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.applicant.email = email.into();
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.applicant.first_name = name.into();
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.applicant.state = state.into();
        self
    }

    pub fn build(self) -> Applicant {
        self.applicant
    }
}

/// Builder for catalog products, starting from `term-life-10`
pub struct ProductBuilder {
    product: Product,
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductBuilder {
    pub fn new() -> Self {
        let mut product = ProductFixtures::term_life_10();
        product.id = ProductId::new_v7();
        Self { product }
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.product.slug = slug.into();
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.product.term_years = years;
        self
    }

    pub fn coverage_range(mut self, min: i64, max: i64) -> Self {
        self.product.min_coverage = min;
        self.product.max_coverage = max;
        self
    }

    pub fn base_rate(mut self, rate: Decimal) -> Self {
        self.product.base_rate = rate;
        self
    }

    pub fn build(self) -> Product {
        self.product
    }
}

/// Builder for quote requests, starting from the reference request
pub struct QuoteInputBuilder {
    input: QuoteInput,
}

impl Default for QuoteInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteInputBuilder {
    pub fn new() -> Self {
        Self {
            input: QuoteFixtures::reference_input(),
        }
    }

    pub fn product(mut self, slug: impl Into<String>, term_years: u32) -> Self {
        self.input.product_slug = slug.into();
        self.input.term_years = term_years;
        self
    }

    pub fn coverage(mut self, amount: i64) -> Self {
        self.input.coverage_amount = amount;
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.input.age = age;
        self
    }

    pub fn smoker(mut self, smoker: bool) -> Self {
        self.input.smoker = smoker;
        self
    }

    pub fn build(self) -> QuoteInput {
        self.input
    }
}
