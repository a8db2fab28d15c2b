use std::sync::Arc;

use parking_lot::Mutex;

use super::engine::SlotEngine;
use super::error::DockError;
use super::observer::{DockNotice, DockObserver};
use crate::actor;
use crate::common::config::DockSettings;
use crate::model::server::DockSnapshot;
use crate::model::{ComponentName, DockItemId};
use crate::sys::platform::{CapabilityProvider, Platform};
use crate::sys::task::UserId;

/// Cloneable, thread-safe handle to one dock.
///
/// Each call holds the engine lock for its whole mutate-fill-publish
/// sequence, so callers on different threads never see a half-applied
/// operation and publishes arrive in the order the operations ran.
#[derive(Clone, Debug)]
pub struct Dock(Arc<Mutex<SlotEngine>>);

impl Dock {
    pub fn new(settings: &DockSettings, platform: Platform) -> Result<Self, DockError> {
        Ok(Self(Arc::new(Mutex::new(SlotEngine::new(settings, platform)?))))
    }

    pub fn user_id(&self) -> UserId { self.0.lock().user_id() }

    pub fn snapshot(&self) -> DockSnapshot { self.0.lock().snapshot() }

    pub fn observe(&self) -> DockObserver { self.0.lock().observe() }

    pub fn stop_observing(&self) { self.0.lock().stop_observing() }

    pub fn subscribe_notices(&self) -> actor::Receiver<DockNotice> {
        self.0.lock().subscribe_notices()
    }

    pub fn pin_by_id(&self, id: DockItemId) -> Result<Option<usize>, DockError> {
        self.0.lock().pin_by_id(id)
    }

    pub fn pin_by_identity(
        &self,
        component: &ComponentName,
        index: Option<usize>,
    ) -> Result<Option<usize>, DockError> {
        self.0.lock().pin_by_identity(component, index)
    }

    pub fn unpin_by_id(&self, id: DockItemId) -> Result<Option<usize>, DockError> {
        self.0.lock().unpin_by_id(id)
    }

    pub fn unpin_by_identity(&self, component: &ComponentName) -> Result<Vec<usize>, DockError> {
        self.0.lock().unpin_by_identity(component)
    }

    pub fn add_or_refresh_dynamic(&self, component: &ComponentName) -> Result<Option<usize>, DockError> {
        self.0.lock().add_or_refresh_dynamic(component)
    }

    pub fn remove_by_package(&self, package: &str) -> Result<Vec<usize>, DockError> {
        self.0.lock().remove_by_package(package)
    }

    pub fn add_package(&self, package: &str) -> Result<(), DockError> { self.0.lock().add_package(package) }

    pub fn refresh_capability_flags(&self, capability: Arc<dyn CapabilityProvider>) -> Result<(), DockError> {
        self.0.lock().refresh_capability_flags(capability)
    }

    pub fn media_service_components(&self) -> Vec<ComponentName> {
        let mut components: Vec<_> = self.0.lock().media_service_components().iter().cloned().collect();
        components.sort();
        components
    }

    /// Runs `f` with the engine locked, for reads that need more than one
    /// accessor to agree. The lock is not reentrant: `f` must not call back
    /// into this `Dock` or any clone of it, or it deadlocks.
    pub fn with_engine<R>(&self, f: impl FnOnce(&SlotEngine) -> R) -> R { f(&*self.0.lock()) }
}
