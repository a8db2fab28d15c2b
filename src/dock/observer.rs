use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::actor;
use crate::model::ComponentName;
use crate::model::DockItem;
use crate::model::server::DockSnapshot;

/// User-facing side effects that are not part of the dock list itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockNotice {
    /// A pin without a target slot found every slot pinned already.
    NoSpaceToPin { component: ComponentName },
}

/// Receiving end of the single dock subscription. Only the latest list is
/// kept; a slow reader skips intermediate lists instead of queueing them.
#[derive(Debug)]
pub struct DockObserver {
    rx: watch::Receiver<DockSnapshot>,
}

impl DockObserver {
    pub fn latest(&self) -> DockSnapshot { self.rx.borrow().clone() }

    /// True when a list was published since the last [`Self::mark_seen`] or
    /// [`Self::changed`]. False once the subscription has been closed.
    pub fn has_changed(&self) -> bool { self.rx.has_changed().unwrap_or(false) }

    pub fn mark_seen(&mut self) -> DockSnapshot { self.rx.borrow_and_update().clone() }

    /// Waits for the next publish. `None` once the dock stopped publishing to
    /// this observer.
    pub async fn changed(&mut self) -> Option<DockSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.mark_seen())
    }

    pub fn into_stream(self) -> WatchStream<DockSnapshot> { WatchStream::new(self.rx) }
}

#[derive(Debug, Default)]
pub(crate) struct Publisher {
    latest: DockSnapshot,
    observer: Option<watch::Sender<DockSnapshot>>,
    notices: Option<actor::Sender<DockNotice>>,
}

impl Publisher {
    pub fn latest(&self) -> &DockSnapshot { &self.latest }

    pub fn publish(&mut self, items: Vec<DockItem>) {
        self.latest = DockSnapshot { generation: self.latest.generation + 1, items };
        trace!(generation = self.latest.generation, "publishing dock list");
        if let Some(tx) = &self.observer {
            tx.send_replace(self.latest.clone());
        }
    }

    /// Replaces any previous observer; the new one starts with the latest list.
    pub fn observe(&mut self) -> DockObserver {
        let (tx, rx) = watch::channel(self.latest.clone());
        self.observer = Some(tx);
        DockObserver { rx }
    }

    pub fn stop_observing(&mut self) { self.observer = None; }

    pub fn subscribe_notices(&mut self) -> actor::Receiver<DockNotice> {
        let (tx, rx) = actor::channel();
        self.notices = Some(tx);
        rx
    }

    pub fn notify(&self, notice: DockNotice) {
        if let Some(tx) = &self.notices {
            tx.send(notice);
        }
    }
}
