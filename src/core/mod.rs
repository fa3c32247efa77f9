pub mod acquisition;
pub mod extraction;
pub mod models;
pub mod orchestrators;
pub mod ports;
