//! Projection engine: pure calculations over in-memory holdings, plus the
//! file and configuration boundary that feeds them.

pub mod allocation;
pub mod analytics;
pub mod benchmark;
pub mod config;
pub mod error;
pub mod health;
pub mod holding;
pub mod loader;
pub mod log;
pub mod projection;

// Re-export main types for cleaner imports
pub use allocation::{AllocationPlan, AllocationPolicy, PurchasePlan};
pub use analytics::Aggregates;
pub use benchmark::{Benchmark, BenchmarkPoint};
pub use error::Error;
pub use holding::{Holding, Portfolio};
pub use projection::{ProjectionPoint, ProjectionPolicy};
