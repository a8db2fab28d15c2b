pub mod engine;
pub mod error;
pub mod handle;
pub mod observer;
pub mod resolver;

pub use engine::SlotEngine;
pub use error::DockError;
pub use handle::Dock;
pub use observer::{DockNotice, DockObserver};
pub use resolver::{CandidateResolver, CandidateSource, Exclusions, ResolveInput};
