//! Casino promotion economics: patron segmentation, lifetime value and
//! campaign ROI projection.

pub mod config;
pub mod economics;
pub mod engine;
pub mod error;
pub mod loader;
pub mod ltv;
pub mod rng;
pub mod roi;
pub mod sample;
pub mod segmentation;
pub mod store;
pub mod summary;
pub mod types;
