pub mod catalog;
pub mod package;
pub mod platform;
pub mod task;
