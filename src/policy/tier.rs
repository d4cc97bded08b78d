// src/policy/tier.rs
use super::tables::PolicyTables;
use super::types::Tier;

/// Classify a brand name into a luxury tier using the standard brand lists.
///
/// Case-insensitive substring match; the first list with a hit wins.
/// Brands on no list fall back to `Tier::A`.
pub fn infer_tier(brand: &str) -> Tier {
    infer_tier_in(PolicyTables::standard(), brand)
}

pub fn infer_tier_in(tables: &PolicyTables, brand: &str) -> Tier {
    let lower = brand.to_lowercase();
    tables
        .tier_brands
        .iter()
        .find(|(_, names)| names.iter().any(|name| lower.contains(name)))
        .map(|(tier, _)| *tier)
        .unwrap_or(Tier::A)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_a_then_d_then_b_then_c() {
        // Hits both the A list and the B list
        assert_eq!(infer_tier("Hermes x Gucci"), Tier::A);
        // Hits both D and C
        assert_eq!(infer_tier("Coach Versace Capsule"), Tier::D);
        // Hits B and C
        assert_eq!(infer_tier("Prada Fendi"), Tier::B);
    }

    #[test]
    fn case_and_substring() {
        assert_eq!(infer_tier("SAINT LAURENT PARIS"), Tier::B);
        assert_eq!(infer_tier("off-white c/o virgil"), Tier::C);
        assert_eq!(infer_tier("Kate Spade New York"), Tier::D);
    }
}
