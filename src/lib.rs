pub mod actor;
pub mod common;
pub mod dock;
pub mod model;
pub mod sys;
