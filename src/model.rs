pub mod component;
pub mod dock_item;
pub mod server;
pub mod slots;

pub use component::{ComponentName, ParseComponentError};
pub use dock_item::{AppMetadata, DockItem, DockItemId, IconRef, ItemKind};
pub use slots::SlotMap;
