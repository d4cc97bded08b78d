// src/policy/aggregate.rs
//
// Evidence → policy. For every (brand, cell) the observation subset is
// classified into exactly one Regime, and each regime has its own pure
// function computing (sale, cap, confidence, why).

use std::collections::HashMap;

use crate::observation::{ObservationRow, ObservationTable};

use super::stats::{clamp, median, percentile, round_even};
use super::tables::PolicyTables;
use super::tier::infer_tier_in;
use super::types::*;

pub const MAX_SALE_PCT: i64 = 60;
pub const MAX_CAP_PCT: i64 = 70;
pub const MAX_MEMBER_EXTRA_PCT: i64 = 15;
pub const MAX_WHY_WORDS: usize = 15;

/// Minimum positive discounts for the sale depth to be read off the data.
pub const SIGNAL_MIN_DISCOUNTS: usize = 5;
/// Minimum pages checked for a cell to count as "mostly full price".
pub const FULL_PRICE_MIN_CHECKED: usize = 10;
/// A full-price cell must have fewer positive discounts than this.
pub const FULL_PRICE_MAX_DISCOUNTS: usize = 2;

/// Sale depth at or above which the member extra is capped.
const DEEP_SALE_PCT: u32 = 30;
const DEEP_SALE_MEMBER_CAP: u32 = 5;

/// Evidence available for one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Regime {
    /// Enough positive discounts to read sale depth from the data.
    ObservedSignal { discounts: Vec<i64> },
    /// Plenty of pages checked, almost none discounted.
    ObservedFullPrice,
    /// Not enough evidence; fall back to category/tier heuristics.
    Inferred,
}

impl Regime {
    pub fn evidence_level(&self) -> EvidenceLevel {
        match self {
            Regime::ObservedSignal { .. } | Regime::ObservedFullPrice => EvidenceLevel::Observed,
            Regime::Inferred => EvidenceLevel::Inferred,
        }
    }
}

/// Numbers and labels produced by a regime, before tier-based extras.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegimeEstimate {
    pub sale_pct: u32,
    pub cap_pct: u32,
    pub confidence: Confidence,
    pub why: &'static str,
}

/// Positive discounts among a cell's observations, truncated to whole percent.
pub fn positive_discounts<I>(values: I) -> Vec<i64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.trunc() as i64)
        .collect()
}

/// Classify a cell from the number of pages checked and its positive discounts.
pub fn classify(checked: usize, discounts: Vec<i64>) -> Regime {
    if discounts.len() >= SIGNAL_MIN_DISCOUNTS {
        Regime::ObservedSignal { discounts }
    } else if checked >= FULL_PRICE_MIN_CHECKED && discounts.len() < FULL_PRICE_MAX_DISCOUNTS {
        Regime::ObservedFullPrice
    } else {
        Regime::Inferred
    }
}

pub fn estimate_observed_signal(discounts: &[i64]) -> RegimeEstimate {
    let mid = median(discounts).unwrap_or(0.0);
    let p75 = percentile(discounts, 75.0).unwrap_or(0.0);

    let sale_pct = clamp(round_even(mid), 0, MAX_SALE_PCT);
    let cap_pct = clamp(round_even(p75), 0, MAX_CAP_PCT).max(sale_pct);

    RegimeEstimate {
        sale_pct,
        cap_pct,
        confidence: Confidence::High,
        why: "Observed sale medians",
    }
}

pub fn estimate_full_price(tables: &PolicyTables, category: Category) -> RegimeEstimate {
    let sale_pct = clamp(tables.full_price_default(category) as i64, 0, MAX_SALE_PCT);
    let cap_pct = clamp(sale_pct as i64 + 5, 0, MAX_CAP_PCT);

    RegimeEstimate {
        sale_pct,
        cap_pct,
        confidence: Confidence::Med,
        why: "Mostly full price",
    }
}

pub fn estimate_inferred(tables: &PolicyTables, tier: Tier, category: Category) -> RegimeEstimate {
    let base = tables.category_default(category) as f64;
    let scaled = match tier {
        Tier::A => ((base * 0.6) as i64).max(4),
        Tier::B => (base * 0.8) as i64,
        Tier::C => (base * 0.9) as i64,
        Tier::D => (base * 1.1) as i64,
    };
    let sale_pct = clamp(scaled, 0, MAX_SALE_PCT);
    let cap_pct = clamp((sale_pct as i64 + 8).max(sale_pct as i64), 0, MAX_CAP_PCT);

    RegimeEstimate {
        sale_pct,
        cap_pct,
        confidence: Confidence::Low,
        why: "Inferred conservative",
    }
}

pub fn estimate(regime: &Regime, tables: &PolicyTables, tier: Tier, category: Category) -> RegimeEstimate {
    match regime {
        Regime::ObservedSignal { discounts } => estimate_observed_signal(discounts),
        Regime::ObservedFullPrice => estimate_full_price(tables, category),
        Regime::Inferred => estimate_inferred(tables, tier, category),
    }
}

/// Tier midpoint, capped at 5 on deep sales, clamped to [0, 15].
pub fn member_extra_for_tier(tables: &PolicyTables, tier: Tier, sale_pct: u32) -> u32 {
    let (low, high) = tables.member_range(tier);
    let mut extra = round_even((low + high) as f64 / 2.0) as u32;
    if sale_pct >= DEEP_SALE_PCT {
        extra = extra.min(DEEP_SALE_MEMBER_CAP);
    }
    clamp(extra as i64, 0, MAX_MEMBER_EXTRA_PCT)
}

pub fn coupon_for_tier(tier: Tier) -> CouponEligibility {
    match tier {
        Tier::A => CouponEligibility::WelcomeOnly,
        _ => CouponEligibility::WelcomeRetarget,
    }
}

/// Keep the first 15 whitespace-separated words.
pub fn trim_why(reason: &str) -> String {
    reason
        .split_whitespace()
        .take(MAX_WHY_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

type CellKey<'a> = (&'a str, Gender, Category);

/// Group discount values by cell. Rows with a missing key field match nothing.
fn group_by_cell(observations: &ObservationTable) -> HashMap<CellKey<'_>, Vec<Option<f64>>> {
    let mut groups: HashMap<CellKey<'_>, Vec<Option<f64>>> = HashMap::new();
    for row in &observations.rows {
        let ObservationRow { brand: Some(brand), gender: Some(gender), category: Some(category), discount_pct } = row
        else { continue };
        groups.entry((brand.as_str(), *gender, *category)).or_default().push(*discount_pct);
    }
    groups
}

/// Build the policy row for one (brand, cell) from that cell's discount values.
pub fn policy_row(
    tables: &PolicyTables,
    brand: &str,
    tier: Tier,
    (gender, category): Cell,
    cell_values: &[Option<f64>],
) -> PolicyRow {
    let discounts = positive_discounts(cell_values.iter().copied());
    let regime = classify(cell_values.len(), discounts);
    let est = estimate(&regime, tables, tier, category);
    let evidence_level = regime.evidence_level();

    let msrp_strikethrough_rule = match evidence_level {
        EvidenceLevel::Observed => MsrpRule::OnlyIfCredible,
        EvidenceLevel::Inferred => MsrpRule::Never,
    };

    PolicyRow {
        brand: s!(brand),
        gender,
        category,
        public_sale_discount_pct: est.sale_pct,
        member_extra_pct: member_extra_for_tier(tables, tier, est.sale_pct),
        public_discount_cap_pct: est.cap_pct,
        discount_visibility: DiscountVisibility::SaleOnly,
        msrp_strikethrough_rule,
        coupon_eligibility: coupon_for_tier(tier),
        evidence_level,
        confidence: est.confidence,
        why: trim_why(est.why),
    }
}

/// One row per brand per cell, brand-major in input order.
pub fn aggregate_policy<S: AsRef<str>>(
    brands: &[S],
    observations: &ObservationTable,
    tables: &PolicyTables,
) -> Vec<PolicyRow> {
    let groups = group_by_cell(observations);
    let mut rows = Vec::with_capacity(brands.len() * CELLS.len());

    for brand in brands {
        let brand = brand.as_ref();
        let tier = infer_tier_in(tables, brand);
        for &(gender, category) in CELLS.iter() {
            let values = groups
                .get(&(brand, gender, category))
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            rows.push(policy_row(tables, brand, tier, (gender, category), values));
        }
    }
    rows
}
