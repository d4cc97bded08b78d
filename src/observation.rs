// src/observation.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::stats::round_even;
use crate::policy::types::{Category, Gender};

/// Column order of the observation log.
pub const OBSERVATION_COLUMNS: [&str; 9] = [
    "brand",
    "gender",
    "category",
    "competitor",
    "url",
    "current_price",
    "was_price",
    "discount_pct",
    "timestamp",
];

/// One scraped price sample. Written once to the run's observation log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub brand: String,
    pub gender: Gender,
    pub category: Category,
    pub competitor: String,
    pub url: String,
    pub current_price: Option<f64>,
    pub was_price: Option<f64>,
    pub discount_pct: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

impl PriceObservation {
    /// Build an observation, deriving `discount_pct` from the two prices.
    pub fn new(
        brand: &str,
        gender: Gender,
        category: Category,
        competitor: &str,
        url: &str,
        current_price: Option<f64>,
        was_price: Option<f64>,
    ) -> Self {
        Self {
            brand: s!(brand),
            gender,
            category,
            competitor: s!(competitor),
            url: s!(url),
            current_price,
            was_price,
            discount_pct: compute_discount_pct(current_price, was_price),
            timestamp: Utc::now(),
        }
    }
}

/// `round((was - current) / was * 100)`, floored at 0.
/// `None` when either price is missing, the current price is zero, or the
/// was price is not positive.
pub fn compute_discount_pct(current_price: Option<f64>, was_price: Option<f64>) -> Option<i64> {
    let current = current_price.filter(|p| *p != 0.0)?;
    let was = was_price.filter(|p| *p > 0.0)?;
    let discount = round_even((was - current) / was * 100.0);
    Some(discount.max(0))
}

/// The aggregator's view of one observation: only the four key columns,
/// every one of them optional. Absent columns and unparseable values are `None`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObservationRow {
    #[serde(deserialize_with = "csv::invalid_option")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub gender: Option<Gender>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub category: Option<Category>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub discount_pct: Option<f64>,
}

impl From<&PriceObservation> for ObservationRow {
    fn from(o: &PriceObservation) -> Self {
        Self {
            brand: Some(o.brand.clone()),
            gender: Some(o.gender),
            category: Some(o.category),
            discount_pct: o.discount_pct.map(|d| d as f64),
        }
    }
}

/// Normalized observation set handed to the policy builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationTable {
    pub rows: Vec<ObservationRow>,
}

impl ObservationTable {
    pub fn new(rows: Vec<ObservationRow>) -> Self { Self { rows } }

    pub fn from_observations(obs: &[PriceObservation]) -> Self {
        Self { rows: obs.iter().map(ObservationRow::from).collect() }
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
