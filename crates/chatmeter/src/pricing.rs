//! Token pricing and cost estimates.
//!
//! Arithmetic is done in integer micro-dollars (1e-6 USD) so that the
//! rendered total is always the exact sum of the rendered parts.

use std::fmt;
use std::ops::Add;

use chatmeter_types::UsageReport;
use serde::Deserialize;
use thiserror::Error;

const TOKENS_PER_UNIT: u128 = 1_000_000;
const MICROS_PER_DOLLAR: f64 = 1_000_000.0;

// ============================================================================
// Price
// ============================================================================

/// Price in micro-dollars per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "f64")]
pub struct Price(u64);

impl Price {
    /// Build a price from dollars per million tokens.
    pub fn from_dollars(dollars: f64) -> Result<Self, PricingError> {
        if !dollars.is_finite() || dollars < 0.0 {
            return Err(PricingError::InvalidPrice(dollars));
        }
        Ok(Self((dollars * MICROS_PER_DOLLAR).round() as u64))
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Cost of `tokens` at this price, rounded half-up to the micro-dollar.
    pub fn cost(self, tokens: u32) -> Cost {
        let scaled = u128::from(tokens) * u128::from(self.0);
        let micros = (scaled + TOKENS_PER_UNIT / 2) / TOKENS_PER_UNIT;
        Cost(micros)
    }
}

impl TryFrom<f64> for Price {
    type Error = PricingError;

    fn try_from(dollars: f64) -> Result<Self, Self::Error> {
        Self::from_dollars(dollars)
    }
}

// ============================================================================
// Cost
// ============================================================================

/// A dollar amount held as micro-dollars. Displays with six fractional digits.
///
/// Wide enough for any `u32` token count at any `u64` price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cost(u128);

impl Cost {
    pub const fn micros(self) -> u128 {
        self.0
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

// ============================================================================
// Pricing
// ============================================================================

/// Per-category unit prices for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pricing {
    #[serde(default = "default_input_price")]
    pub input_per_mtok: Price,
    #[serde(default = "default_output_price")]
    pub output_per_mtok: Price,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_mtok: default_input_price(),
            output_per_mtok: default_output_price(),
        }
    }
}

fn default_input_price() -> Price {
    Price::from_micros(3_000_000)
}

fn default_output_price() -> Price {
    Price::from_micros(15_000_000)
}

impl Pricing {
    pub fn input_cost(&self, tokens: u32) -> Cost {
        self.input_per_mtok.cost(tokens)
    }

    pub fn output_cost(&self, tokens: u32) -> Cost {
        self.output_per_mtok.cost(tokens)
    }

    /// Build the usage report attached to a reply.
    pub fn usage_report(&self, input_tokens: u32, output_tokens: u32) -> UsageReport {
        let input_cost = self.input_cost(input_tokens);
        let output_cost = self.output_cost(output_tokens);
        UsageReport {
            input_tokens,
            output_tokens,
            input_cost: input_cost.to_string(),
            output_cost: output_cost.to_string(),
            total_cost: (input_cost + output_cost).to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("invalid price {0}: must be a finite, non-negative number")]
    InvalidPrice(f64),
}
