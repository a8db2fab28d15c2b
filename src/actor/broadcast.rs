use serde::{Deserialize, Serialize};

use crate::dock::DockNotice;
use crate::model::ComponentName;
use crate::model::server::{DockItemData, DockSnapshot};

/// What the dock tells the outside world, in wire form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum BroadcastEvent {
    DockChanged {
        generation: u64,
        items: Vec<DockItemData>,
    },
    NoSpaceToPin {
        component: ComponentName,
    },
}

impl From<&DockSnapshot> for BroadcastEvent {
    fn from(snapshot: &DockSnapshot) -> Self {
        BroadcastEvent::DockChanged {
            generation: snapshot.generation,
            items: snapshot.to_data(),
        }
    }
}

impl From<DockNotice> for BroadcastEvent {
    fn from(notice: DockNotice) -> Self {
        match notice {
            DockNotice::NoSpaceToPin { component } => BroadcastEvent::NoSpaceToPin { component },
        }
    }
}

pub type BroadcastSender = crate::actor::Sender<BroadcastEvent>;
pub type BroadcastReceiver = crate::actor::Receiver<BroadcastEvent>;
