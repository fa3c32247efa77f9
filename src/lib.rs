pub mod adapters;
pub mod core;
pub mod global_constants;
pub mod ports;
pub mod selection_script;
