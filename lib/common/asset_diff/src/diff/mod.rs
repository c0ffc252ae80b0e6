pub mod asset_types;
pub mod calculator;
pub mod change_vector;
pub mod classifier;
pub mod clock;
pub mod error;
