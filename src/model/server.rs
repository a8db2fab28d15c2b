use serde::{Deserialize, Serialize};

use super::{DockItem, DockItemId, ItemKind};

/// Wire form of one dock occupant as handed to subscribers outside the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockItemData {
    pub id: DockItemId,
    pub slot: usize,
    pub kind: ItemKind,
    pub component: String,
    pub label: String,
    pub icon: String,
    pub icon_color: u32,
    pub restricted: bool,
    pub is_media: bool,
}

impl DockItemData {
    pub fn from_item(slot: usize, item: &DockItem) -> Self {
        Self {
            id: item.id,
            slot,
            kind: item.kind,
            component: item.component.flatten(),
            label: item.label.clone(),
            icon: item.icon.as_str().to_string(),
            icon_color: item.icon_color,
            restricted: item.restricted,
            is_media: item.is_media,
        }
    }
}

/// The full dock list as of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockSnapshot {
    /// Bumped once per publish, starting at 1 for the initial list.
    pub generation: u64,
    pub items: Vec<DockItem>,
}

impl DockSnapshot {
    pub fn to_data(&self) -> Vec<DockItemData> {
        self.items.iter().enumerate().map(|(slot, item)| DockItemData::from_item(slot, item)).collect()
    }

    pub fn packages(&self) -> Vec<&str> { self.items.iter().map(DockItem::package).collect() }
}
