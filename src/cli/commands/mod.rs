pub mod browse;
pub mod config;
pub mod deep_dive;
pub mod estimate;
pub mod explain;
pub mod file;
pub mod session;
