pub mod binary_strategy;
pub mod download_strategy;
pub mod metadata_strategy;
