// src/gui/actions/mod.rs
//
// Folder module facade: re-export public entrypoints.
// Submodules stay private; consumers only see actions::{copy, export, run controls}.

mod copy;    // src/gui/actions/copy.rs
mod export;  // src/gui/actions/export.rs
mod run;     // src/gui/actions/run.rs

pub use copy::copy;
pub use export::export;
pub use run::{cancel, load_brands, new_run, pause, resume, start};
