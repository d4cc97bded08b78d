// src/policy/mod.rs
//! # Discount policy inference
//!
//! Turns a sparse set of price observations into one bounded policy row per
//! (brand, gender, category) cell.
//!
//! ## Evidence regimes
//! - **ObservedSignal** – at least 5 positive discounts: sale depth is the
//!   median, cap is the 75th percentile (never below the sale depth).
//! - **ObservedFullPrice** – at least 10 pages checked but fewer than 2
//!   discounted: category "mostly full price" depth, cap = sale + 5.
//! - **Inferred** – anything else: category default scaled by brand tier,
//!   cap = sale + 8.
//!
//! ## Bounds (every row)
//! - `public_sale_discount_pct` in [0, 60]
//! - `public_discount_cap_pct` in [0, 70] and ≥ sale
//! - `member_extra_pct` in [0, 15]
//!
//! Everything here is pure: no I/O, no shared state. The lookup tables are
//! built once ([`PolicyTables::standard`]) and passed by reference.
//!
//! ## Typical call chain
//! ```text
//! runner / cli → store::load_observations → build_policy_output
//!                                             ├─ empty  → inferred_defaults
//!                                             └─ else   → aggregate_policy
//! ```
pub mod aggregate;
pub mod output;
pub mod stats;
pub mod tables;
pub mod tier;
pub mod types;

pub use aggregate::{aggregate_policy, Regime};
pub use output::{build_policy_output, build_policy_output_with, PolicySummary, PolicyTable};
pub use tables::PolicyTables;
pub use tier::infer_tier;
pub use types::{Category, Cell, Gender, PolicyRow, Tier, CELLS, POLICY_COLUMNS};
