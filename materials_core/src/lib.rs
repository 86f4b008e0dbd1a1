pub mod catalog;
pub mod config;
pub mod delivery;
pub mod downloader;
pub mod notify;
pub mod session;
pub mod types;
