// TabRescue - platform/mod.rs
//
// Platform abstraction layer: OS-specific browser locations, process
// handling, filesystem copying, and configuration directories.
// Dependencies: standard library, directories, sysinfo, walkdir.
// Must NOT depend on: app layer.

pub mod config;
pub mod fs;
pub mod paths;
pub mod process;
