// TabRescue - app/mod.rs
//
// Application layer: the export and import pipelines.
// Dependencies: core and platform layers.

pub mod export;
pub mod import;
