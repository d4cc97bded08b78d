// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;

pub mod observation;
pub mod policy;

pub mod brands;
pub mod discovery;
pub mod extract;
pub mod file;
pub mod progress;
pub mod runner;
pub mod store;

pub mod gui;
#[cfg(feature = "cli")]
pub mod cli;
