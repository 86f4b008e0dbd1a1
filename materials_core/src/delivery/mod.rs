pub mod file_delivery;
pub mod path_sanitizer;
