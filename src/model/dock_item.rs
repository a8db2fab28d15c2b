use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::ComponentName;

const MAX_UNIQUE_ID_TRIES: usize = 20;

/// Colour used when the metadata source has no dominant icon colour.
pub const DEFAULT_ICON_COLOR: u32 = 0xFF_C8_C8_C8;

/// Surrogate key of a dock occupant, stable while the item changes kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DockItemId(Uuid);

impl DockItemId {
    pub fn new(id: Uuid) -> Self { Self(id) }

    pub fn get(&self) -> Uuid { self.0 }

    /// Draws a random id not accepted by `is_taken`. After
    /// `MAX_UNIQUE_ID_TRIES` misses the next id is used unchecked.
    pub fn generate(is_taken: impl Fn(&DockItemId) -> bool) -> Self {
        for _ in 0..MAX_UNIQUE_ID_TRIES {
            let id = Self(Uuid::new_v4());
            if !is_taken(&id) {
                return id;
            }
        }
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DockItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// Pinned by the user; never replaced by usage traffic.
    Static,
    /// Filled from usage signals; evicted least recently used first.
    Dynamic,
}

/// Opaque handle to an icon owned by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(Arc<str>);

impl IconRef {
    pub fn new(icon: impl Into<Arc<str>>) -> Self { Self(icon.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

/// Presentation data a metadata source knows about one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMetadata {
    pub label: String,
    pub icon: IconRef,
    pub icon_color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockItem {
    pub id: DockItemId,
    pub kind: ItemKind,
    pub component: ComponentName,
    pub label: String,
    pub icon: IconRef,
    pub icon_color: u32,
    /// Not usable while the vehicle is moving.
    pub restricted: bool,
    pub is_media: bool,
}

impl DockItem {
    pub fn package(&self) -> &str { self.component.package() }

    pub fn is_static(&self) -> bool { self.kind == ItemKind::Static }

    pub fn is_dynamic(&self) -> bool { self.kind == ItemKind::Dynamic }

    pub fn with_kind(&self, kind: ItemKind) -> Self { Self { kind, ..self.clone() } }

    pub fn with_restricted(&self, restricted: bool) -> Self { Self { restricted, ..self.clone() } }
}
