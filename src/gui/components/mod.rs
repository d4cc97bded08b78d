// src/gui/components/mod.rs
pub mod brand_panel;
pub mod controls;
pub mod data_table;
pub mod export_bar;
pub mod summary;
