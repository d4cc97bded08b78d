// src/policy/tables.rs
//
// Fixed lookup tables behind the aggregator. Built once, shared by reference.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::types::{Category, Tier};

pub const CATEGORY_FALLBACK_SALE: u32 = 10;
pub const FULL_PRICE_FALLBACK_SALE: u32 = 6;
pub const DEFAULTS_FALLBACK_POLICY: (u32, u32) = (10, 25);

#[derive(Clone, Debug)]
pub struct PolicyTables {
    /// Base sale depth per category before tier scaling (Inferred regime).
    pub category_defaults: HashMap<Category, u32>,
    /// Sale depth for cells that were checked but are mostly full price.
    pub mostly_full_price: HashMap<Category, u32>,
    /// (sale, cap) used when a run has no observations at all.
    pub default_policy: HashMap<Category, (u32, u32)>,
    /// Brand-name fragments per tier, in match priority order.
    pub tier_brands: Vec<(Tier, Vec<&'static str>)>,
    /// Member-extra range (low, high) per tier.
    pub member_ranges: HashMap<Tier, (u32, u32)>,
}

static STANDARD: LazyLock<PolicyTables> = LazyLock::new(PolicyTables::build_standard);

impl PolicyTables {
    /// The process-wide table set.
    pub fn standard() -> &'static PolicyTables {
        &STANDARD
    }

    fn build_standard() -> Self {
        use Category::*;

        let category_defaults = HashMap::from([
            (Clothing, 20),
            (Shoes, 18),
            (Bags, 10),
            (Accessories, 12),
            (Jewelry, 8),
            (Watches, 6),
            (Beauty, 15),
        ]);

        let mostly_full_price = HashMap::from([
            (Clothing, 8),
            (Shoes, 8),
            (Bags, 4),
            (Accessories, 6),
            (Jewelry, 3),
            (Watches, 2),
            (Beauty, 6),
        ]);

        let default_policy = HashMap::from([
            (Clothing, (20, 40)),
            (Shoes, (15, 35)),
            (Bags, (10, 25)),
            (Accessories, (15, 35)),
            (Jewelry, (5, 15)),
            (Watches, (0, 10)),
            (Beauty, (15, 35)),
        ]);

        // A is checked before D, D before B, B before C.
        let tier_brands = vec![
            (Tier::A, vec!["rolex", "cartier", "hermes", "chanel", "patek", "omega", "louis vuitton"]),
            (Tier::D, vec!["michael kors", "coach", "kate spade", "tory burch"]),
            (Tier::B, vec!["gucci", "prada", "saint laurent", "balenciaga"]),
            (Tier::C, vec!["off-white", "versace", "fendi"]),
        ];

        let member_ranges = HashMap::from([
            (Tier::A, (3, 5)),
            (Tier::B, (5, 5)),
            (Tier::C, (6, 8)),
            (Tier::D, (8, 12)),
        ]);

        Self { category_defaults, mostly_full_price, default_policy, tier_brands, member_ranges }
    }

    pub fn category_default(&self, category: Category) -> u32 {
        self.category_defaults.get(&category).copied().unwrap_or(CATEGORY_FALLBACK_SALE)
    }

    pub fn full_price_default(&self, category: Category) -> u32 {
        self.mostly_full_price.get(&category).copied().unwrap_or(FULL_PRICE_FALLBACK_SALE)
    }

    pub fn default_policy(&self, category: Category) -> (u32, u32) {
        self.default_policy.get(&category).copied().unwrap_or(DEFAULTS_FALLBACK_POLICY)
    }

    pub fn member_range(&self, tier: Tier) -> (u32, u32) {
        self.member_ranges.get(&tier).copied().unwrap_or((3, 5))
    }
}
