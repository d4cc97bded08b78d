// src/policy/output.rs
//
// Policy table assembly. Two paths:
// - no observations at all → category defaults for every cell, aggregator skipped
// - otherwise              → aggregate_policy
// Either way the result is the canonical 12-column table.

use crate::observation::ObservationTable;

use super::aggregate::aggregate_policy;
use super::tables::PolicyTables;
use super::types::*;

pub const DEFAULTS_WHY: &str = "No observations; inferred defaults";
const DEFAULTS_MEMBER_EXTRA: u32 = 5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyTable {
    pub rows: Vec<PolicyRow>,
}

/// Headline numbers shown after each batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicySummary {
    pub observed_rows: usize,
    pub inferred_rows: usize,
    pub avg_sale_pct: f64,
}

impl PolicyTable {
    pub fn columns(&self) -> &'static [&'static str] { &POLICY_COLUMNS }

    pub fn headers(&self) -> Vec<String> {
        POLICY_COLUMNS.iter().map(|c| s!(*c)).collect()
    }

    /// Rows as string cells in canonical column order.
    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(PolicyRow::to_record).collect()
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn summary(&self) -> PolicySummary {
        let observed_rows = self.rows.iter()
            .filter(|r| r.evidence_level == EvidenceLevel::Observed)
            .count();
        let inferred_rows = self.rows.len() - observed_rows;

        let avg_sale_pct = if self.rows.is_empty() {
            0.0
        } else {
            let total: u64 = self.rows.iter().map(|r| r.public_sale_discount_pct as u64).sum();
            let mean = total as f64 / self.rows.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        PolicySummary { observed_rows, inferred_rows, avg_sale_pct }
    }
}

/// Rows for a run that has no observations yet. Tier is not consulted here,
/// so coupon eligibility is always WELCOME+RETARGET.
pub fn inferred_defaults<S: AsRef<str>>(brands: &[S], tables: &PolicyTables) -> Vec<PolicyRow> {
    let mut rows = Vec::with_capacity(brands.len() * CELLS.len());
    for brand in brands {
        for &(gender, category) in CELLS.iter() {
            let (sale_pct, cap_pct) = tables.default_policy(category);
            let mut member_extra = DEFAULTS_MEMBER_EXTRA;
            if sale_pct >= 30 {
                member_extra = member_extra.min(5);
            }
            rows.push(PolicyRow {
                brand: s!(brand.as_ref()),
                gender,
                category,
                public_sale_discount_pct: sale_pct,
                member_extra_pct: member_extra,
                public_discount_cap_pct: cap_pct,
                discount_visibility: DiscountVisibility::SaleOnly,
                msrp_strikethrough_rule: MsrpRule::Never,
                coupon_eligibility: CouponEligibility::WelcomeRetarget,
                evidence_level: EvidenceLevel::Inferred,
                confidence: Confidence::Low,
                why: s!(DEFAULTS_WHY),
            });
        }
    }
    rows
}

/// Build the policy table for `brands` using the standard lookup tables.
pub fn build_policy_output<S: AsRef<str>>(brands: &[S], observations: &ObservationTable) -> PolicyTable {
    build_policy_output_with(brands, observations, PolicyTables::standard())
}

pub fn build_policy_output_with<S: AsRef<str>>(
    brands: &[S],
    observations: &ObservationTable,
    tables: &PolicyTables,
) -> PolicyTable {
    let rows = if observations.is_empty() {
        logd!("Policy: no observations, defaults for {} brand(s)", brands.len());
        inferred_defaults(brands, tables)
    } else {
        logd!("Policy: aggregating {} observation(s) for {} brand(s)", observations.len(), brands.len());
        aggregate_policy(brands, observations, tables)
    };
    PolicyTable { rows }
}
