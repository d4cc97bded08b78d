// src/policy/types.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Clothing,
    Shoes,
    Bags,
    Accessories,
    Jewelry,
    Watches,
    Beauty,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clothing    => "Clothing",
            Category::Shoes       => "Shoes",
            Category::Bags        => "Bags",
            Category::Accessories => "Accessories",
            Category::Jewelry     => "Jewelry",
            Category::Watches     => "Watches",
            Category::Beauty      => "Beauty",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (gender, category) column of the policy grid.
pub type Cell = (Gender, Category);

/// The fixed cell enumeration. Not a full cross product: Beauty is Women-only.
pub const CELLS: [Cell; 13] = [
    (Gender::Men, Category::Clothing),
    (Gender::Men, Category::Shoes),
    (Gender::Men, Category::Bags),
    (Gender::Men, Category::Accessories),
    (Gender::Men, Category::Jewelry),
    (Gender::Men, Category::Watches),
    (Gender::Women, Category::Clothing),
    (Gender::Women, Category::Shoes),
    (Gender::Women, Category::Bags),
    (Gender::Women, Category::Accessories),
    (Gender::Women, Category::Jewelry),
    (Gender::Women, Category::Watches),
    (Gender::Women, Category::Beauty),
];

/// Coarse luxury tier. A is the top of the market, D the most promotional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    A,
    B,
    C,
    D,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiscountVisibility {
    #[serde(rename = "SALE_ONLY")]
    SaleOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MsrpRule {
    #[serde(rename = "NEVER")]
    Never,
    #[serde(rename = "ONLY_IF_CREDIBLE")]
    OnlyIfCredible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CouponEligibility {
    #[serde(rename = "WELCOME_ONLY")]
    WelcomeOnly,
    #[serde(rename = "WELCOME+RETARGET")]
    WelcomeRetarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EvidenceLevel {
    #[serde(rename = "OBSERVED")]
    Observed,
    #[serde(rename = "INFERRED")]
    Inferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Confidence {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MED")]
    Med,
    #[serde(rename = "LOW")]
    Low,
}

impl DiscountVisibility {
    pub fn as_str(&self) -> &'static str { "SALE_ONLY" }
}

impl MsrpRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            MsrpRule::Never => "NEVER",
            MsrpRule::OnlyIfCredible => "ONLY_IF_CREDIBLE",
        }
    }
}

impl CouponEligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponEligibility::WelcomeOnly => "WELCOME_ONLY",
            CouponEligibility::WelcomeRetarget => "WELCOME+RETARGET",
        }
    }
}

impl EvidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceLevel::Observed => "OBSERVED",
            EvidenceLevel::Inferred => "INFERRED",
        }
    }
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Med  => "MED",
            Confidence::Low  => "LOW",
        }
    }
}

/// Canonical output column order. Exports and the dashboard table use this as-is.
pub const POLICY_COLUMNS: [&str; 12] = [
    "brand",
    "gender",
    "category",
    "public_sale_discount_pct",
    "member_extra_pct",
    "public_discount_cap_pct",
    "discount_visibility",
    "msrp_strikethrough_rule",
    "coupon_eligibility",
    "evidence_level",
    "confidence",
    "why",
];

/// One policy estimate for a (brand, gender, category) cell.
///
/// Field order matches [`POLICY_COLUMNS`], so the serde representation is
/// already in canonical column order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PolicyRow {
    pub brand: String,
    pub gender: Gender,
    pub category: Category,
    pub public_sale_discount_pct: u32,
    pub member_extra_pct: u32,
    pub public_discount_cap_pct: u32,
    pub discount_visibility: DiscountVisibility,
    pub msrp_strikethrough_rule: MsrpRule,
    pub coupon_eligibility: CouponEligibility,
    pub evidence_level: EvidenceLevel,
    pub confidence: Confidence,
    pub why: String,
}

impl PolicyRow {
    /// Cells as display strings, in canonical column order.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.brand.clone(),
            s!(self.gender.as_str()),
            s!(self.category.as_str()),
            self.public_sale_discount_pct.to_string(),
            self.member_extra_pct.to_string(),
            self.public_discount_cap_pct.to_string(),
            s!(self.discount_visibility.as_str()),
            s!(self.msrp_strikethrough_rule.as_str()),
            s!(self.coupon_eligibility.as_str()),
            s!(self.evidence_level.as_str()),
            s!(self.confidence.as_str()),
            self.why.clone(),
        ]
    }
}
