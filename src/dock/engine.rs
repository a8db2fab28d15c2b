//! The slot engine: which app sits in which dock slot, and why.
//!
//! Slots hold either user-pinned ([`ItemKind::Static`]) or usage-driven
//! ([`ItemKind::Dynamic`]) items. Dynamic traffic never displaces a pinned
//! item; among dynamic items the least recently touched slot is replaced
//! first. After every operation empty slots are refilled from the user's
//! running tasks or, failing that, from a random launcher app, and the full
//! list is published.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use super::error::DockError;
use super::observer::{DockNotice, DockObserver, Publisher};
use super::resolver::{CandidateResolver, Exclusions, ResolveInput};
use crate::actor;
use crate::common::collections::HashSet;
use crate::common::config::DockSettings;
use crate::model::dock_item::DEFAULT_ICON_COLOR;
use crate::model::server::DockSnapshot;
use crate::model::{ComponentName, DockItem, DockItemId, ItemKind, SlotMap};
use crate::sys::platform::{CapabilityProvider, MetadataProvider, Platform};
use crate::sys::task::UserId;

pub struct SlotEngine {
    user_id: UserId,
    slots: SlotMap,
    exclusions: Exclusions,
    launcher: HashSet<ComponentName>,
    media: HashSet<ComponentName>,
    platform: Platform,
    capability: Option<Arc<dyn CapabilityProvider>>,
    resolver: CandidateResolver,
    publisher: Publisher,
}

/// Builds dock items from platform metadata.
struct ItemFactory<'a> {
    metadata: &'a dyn MetadataProvider,
    media: &'a HashSet<ComponentName>,
    capability: Option<&'a dyn CapabilityProvider>,
    slots: &'a SlotMap,
}

impl ItemFactory<'_> {
    fn build(&self, component: &ComponentName, kind: ItemKind) -> Option<DockItem> {
        let is_media = self.media.contains(component);
        let Some(metadata) = self.metadata.resolve(component, is_media) else {
            debug!(%component, "component not found; not placing it");
            return None;
        };
        Some(DockItem {
            id: DockItemId::generate(|id| self.slots.contains_id(id)),
            kind,
            component: component.clone(),
            label: metadata.label,
            icon: metadata.icon,
            icon_color: metadata.icon_color.unwrap_or(DEFAULT_ICON_COLOR),
            restricted: is_restricted(self.capability, component, is_media),
            is_media,
        })
    }
}

fn is_restricted(
    capability: Option<&dyn CapabilityProvider>,
    component: &ComponentName,
    is_media: bool,
) -> bool {
    // Media sources are always usable; everything else needs the capability
    // service to vouch for it.
    !(is_media || capability.is_some_and(|c| c.is_distraction_optimized(component)))
}

impl SlotEngine {
    /// Seeds the dock with `settings.default_pinned` and publishes the first
    /// list. Defaults past the capacity are dropped; defaults without metadata
    /// leave their slot to be filled like any other empty slot.
    pub fn new(settings: &DockSettings, platform: Platform) -> Result<Self, DockError> {
        let launcher = platform.launcher.launcher_components(None).into_iter().collect();
        let media = platform.media.media_components(None).into_iter().collect();
        let mut engine = Self {
            user_id: settings.user_id,
            slots: SlotMap::new(settings.capacity),
            exclusions: Exclusions::new(
                settings.excluded_packages.iter().cloned(),
                settings.excluded_components.iter().cloned(),
            ),
            launcher,
            media,
            platform,
            capability: None,
            resolver: CandidateResolver::new(settings.shuffle_seed),
            publisher: Publisher::default(),
        };
        for (index, component) in settings.default_pinned.iter().take(settings.capacity).enumerate() {
            let item = engine.factory().build(component, ItemKind::Static);
            match item {
                Some(item) => {
                    engine.slots.replace(index, item);
                }
                None => debug!(%component, index, "default pinned app unavailable"),
            }
        }
        engine.publish()?;
        Ok(engine)
    }

    pub fn capacity(&self) -> usize { self.slots.capacity() }

    pub fn user_id(&self) -> UserId { self.user_id }

    pub fn slots(&self) -> &SlotMap { &self.slots }

    pub fn snapshot(&self) -> DockSnapshot { self.publisher.latest().clone() }

    pub fn media_service_components(&self) -> &HashSet<ComponentName> { &self.media }

    pub fn launcher_components(&self) -> &HashSet<ComponentName> { &self.launcher }

    pub fn observe(&mut self) -> DockObserver { self.publisher.observe() }

    pub fn stop_observing(&mut self) { self.publisher.stop_observing(); }

    pub fn subscribe_notices(&mut self) -> actor::Receiver<DockNotice> {
        self.publisher.subscribe_notices()
    }

    /// Pins the item with `id` where it stands. Pinning does not count as a
    /// touch, so the slot keeps its recency position.
    #[instrument(level = "debug", skip(self))]
    pub fn pin_by_id(&mut self, id: DockItemId) -> Result<Option<usize>, DockError> {
        let pinned = self.slots.index_of_id(id).map(|index| {
            let item = self.slots.get(index).map(|item| item.with_kind(ItemKind::Static));
            if let Some(item) = item {
                info!(component = %item.component, index, "pinning dock item");
                self.slots.replace(index, item);
            }
            index
        });
        if pinned.is_none() {
            debug!("no dock item with that id");
        }
        self.publish()?;
        Ok(pinned)
    }

    /// Pins `component` at `index`, or when no index is given at the first
    /// slot that is empty or dynamic. With every slot pinned nothing changes
    /// and a [`DockNotice::NoSpaceToPin`] goes out.
    #[instrument(level = "debug", skip(self, component), fields(%component))]
    pub fn pin_by_identity(
        &mut self,
        component: &ComponentName,
        index: Option<usize>,
    ) -> Result<Option<usize>, DockError> {
        let placed = self.place_pinned(component, index);
        self.publish()?;
        Ok(placed)
    }

    fn place_pinned(&mut self, component: &ComponentName, index: Option<usize>) -> Option<usize> {
        let item = self.factory().build(component, ItemKind::Static)?;
        let index = match index {
            Some(index) if self.slots.in_bounds(index) => index,
            Some(index) => {
                debug!(index, "pin index outside the dock");
                return None;
            }
            None => match self.slots.lowest_replaceable_index() {
                Some(index) => index,
                None => {
                    debug!("no dynamic or empty slot available to pin");
                    self.publisher.notify(DockNotice::NoSpaceToPin { component: component.clone() });
                    return None;
                }
            },
        };
        info!(index, "pinning app");
        self.slots.replace(index, item);
        Some(index)
    }

    /// Clears the slot holding the item with `id`.
    pub fn unpin_by_id(&mut self, id: DockItemId) -> Result<Option<usize>, DockError> {
        let removed = self.slots.index_of_id(id);
        if let Some(index) = removed
            && let Some(item) = self.slots.remove(index)
        {
            info!(component = %item.component, index, "unpinned dock item");
        } else {
            debug!(%id, "no dock item with that id");
        }
        self.publish()?;
        Ok(removed)
    }

    /// Clears every slot showing exactly `component`.
    pub fn unpin_by_identity(&mut self, component: &ComponentName) -> Result<Vec<usize>, DockError> {
        let cleared = self.slots.retain(|_, item| item.component != *component);
        debug!(%component, ?cleared, "unpinned component");
        self.publish()?;
        Ok(cleared)
    }

    /// Records that `component` was just used. A pinned app of the same
    /// package is left alone; a dynamic one is refreshed in its slot;
    /// otherwise the app takes a free slot or evicts the least recently
    /// touched dynamic item.
    #[instrument(level = "debug", skip(self, component), fields(%component))]
    pub fn add_or_refresh_dynamic(&mut self, component: &ComponentName) -> Result<Option<usize>, DockError> {
        let placed = self.place_dynamic(component);
        self.publish()?;
        Ok(placed)
    }

    fn place_dynamic(&mut self, component: &ComponentName) -> Option<usize> {
        if self.exclusions.excludes(component) {
            debug!("app is excluded from the dock");
            return None;
        }
        let package = component.package();
        if self.slots.iter().any(|(_, item)| item.is_static() && item.package() == package) {
            debug!("app is already pinned");
            return None;
        }
        let target = self.slots.index_of_package(package).or_else(|| {
            if self.slots.is_full() {
                self.slots.least_recent_dynamic()
            } else {
                self.slots.lowest_free_index()
            }
        });
        let Some(index) = target else {
            debug!("every slot is pinned");
            return None;
        };
        let item = self.factory().build(component, ItemKind::Dynamic)?;
        debug!(index, "placing dynamic app");
        self.slots.touch(index, item);
        Some(index)
    }

    /// Forgets `package`: its slots are cleared whatever their kind and it is
    /// no longer offered as a launcher or media candidate.
    pub fn remove_by_package(&mut self, package: &str) -> Result<Vec<usize>, DockError> {
        let cleared = self.slots.retain(|_, item| item.package() != package);
        self.launcher.retain(|c| !c.is_in_package(package));
        let media_before = self.media.len();
        self.media.retain(|c| !c.is_in_package(package));
        if media_before != self.media.len() {
            debug!(package, "media components removed");
        }
        info!(package, ?cleared, "package removed from dock");
        self.publish()?;
        Ok(cleared)
    }

    /// Makes a newly installed or enabled package available as a candidate.
    pub fn add_package(&mut self, package: &str) -> Result<(), DockError> {
        let launcher = self.platform.launcher.launcher_components(Some(package));
        let media = self.platform.media.media_components(Some(package));
        debug!(package, ?launcher, ?media, "package added");
        self.launcher.extend(launcher);
        self.media.extend(media);
        self.publish()
    }

    /// Swaps in a new capability service and recomputes every item's
    /// restriction. Kinds, slots and recency stay as they are.
    pub fn refresh_capability_flags(
        &mut self,
        capability: Arc<dyn CapabilityProvider>,
    ) -> Result<(), DockError> {
        self.capability = Some(capability);
        let capability = self.capability.as_deref();
        self.slots.update_all(|item| {
            item.with_restricted(is_restricted(capability, &item.component, item.is_media))
        });
        self.publish()
    }

    /// Fills every empty slot and returns the list in slot order.
    ///
    /// Filling is a real mutation: a recommended app stays in its slot
    /// afterwards as a dynamic item. Fails when some slot has no candidate
    /// at all, leaving any slots filled before it in place.
    pub fn materialize_full_list(&mut self) -> Result<Vec<DockItem>, DockError> {
        let tasks: Vec<ComponentName> = self
            .platform
            .tasks
            .current_tasks()
            .into_iter()
            .filter(|task| task.user_id == self.user_id)
            .filter_map(|task| task.component())
            .collect();

        for index in 0..self.slots.capacity() {
            if self.slots.contains(index) {
                continue;
            }
            let placed_packages: HashSet<String> = self.slots.packages().map(str::to_owned).collect();
            let input = ResolveInput {
                tasks: &tasks,
                launcher: &self.launcher,
                placed_packages: &placed_packages,
                exclusions: &self.exclusions,
            };
            let factory = ItemFactory {
                metadata: &*self.platform.metadata,
                media: &self.media,
                capability: self.capability.as_deref(),
                slots: &self.slots,
            };
            let found = self.resolver.resolve_with(&input, |component, source| {
                let item = factory.build(component, ItemKind::Dynamic)?;
                debug!(%component, %source, index, "filling empty slot");
                Some(item)
            });
            let Some(item) = found else {
                error!(index, "no app left to fill dock slot");
                return Err(DockError::CandidatesExhausted { index, capacity: self.slots.capacity() });
            };
            self.slots.replace(index, item);
        }
        Ok(self.slots.to_dense())
    }

    fn publish(&mut self) -> Result<(), DockError> {
        let items = self.materialize_full_list()?;
        self.publisher.publish(items);
        Ok(())
    }

    fn factory(&self) -> ItemFactory<'_> {
        ItemFactory {
            metadata: &*self.platform.metadata,
            media: &self.media,
            capability: self.capability.as_deref(),
            slots: &self.slots,
        }
    }
}

impl std::fmt::Debug for SlotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotEngine")
            .field("user_id", &self.user_id)
            .field("slots", &self.slots)
            .field("generation", &self.publisher.latest().generation)
            .finish_non_exhaustive()
    }
}
