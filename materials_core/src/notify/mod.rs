pub mod log_observer;
pub mod notice;
pub mod notifier;
pub mod observer;
