pub mod material_downloader;
pub mod strategy;
