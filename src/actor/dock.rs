//! Message-passing front end for a [`Dock`]. Platform feeds send events and
//! the actor applies them one at a time, in arrival order.

use std::fmt;
use std::sync::Arc;

use strum::{Display, EnumString};
use tracing::{debug, error, instrument, warn};

use crate::actor;
use crate::actor::broadcast::{BroadcastEvent, BroadcastSender};
use crate::dock::{Dock, DockError};
use crate::model::{ComponentName, DockItemId};
use crate::sys::package::{PackageEffect, PackageEvent};
use crate::sys::platform::CapabilityProvider;
use crate::sys::task::RunningTask;

/// Textual dock actions coming from the launcher UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DockAction {
    Launch,
    Pin,
    Unpin,
}

pub enum Event {
    AppLaunched(ComponentName),
    TaskMovedToFront(RunningTask),
    PinItem(DockItemId),
    /// Pins whatever occupies the slot once the events ahead of this one
    /// have been applied.
    PinSlot(usize),
    PinComponent {
        component: ComponentName,
        index: Option<usize>,
    },
    UnpinItem(DockItemId),
    UnpinSlot(usize),
    UnpinComponent(ComponentName),
    /// An action by name; unknown names are dropped.
    Action {
        action: String,
        component: ComponentName,
    },
    Package(PackageEvent),
    CapabilityProviderReady(Arc<dyn CapabilityProvider>),
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppLaunched(c) => f.debug_tuple("AppLaunched").field(c).finish(),
            Self::TaskMovedToFront(task) => f.debug_tuple("TaskMovedToFront").field(task).finish(),
            Self::PinItem(id) => f.debug_tuple("PinItem").field(id).finish(),
            Self::PinSlot(slot) => f.debug_tuple("PinSlot").field(slot).finish(),
            Self::PinComponent { component, index } => f
                .debug_struct("PinComponent")
                .field("component", component)
                .field("index", index)
                .finish(),
            Self::UnpinItem(id) => f.debug_tuple("UnpinItem").field(id).finish(),
            Self::UnpinSlot(slot) => f.debug_tuple("UnpinSlot").field(slot).finish(),
            Self::UnpinComponent(c) => f.debug_tuple("UnpinComponent").field(c).finish(),
            Self::Action { action, component } => f
                .debug_struct("Action")
                .field("action", action)
                .field("component", component)
                .finish(),
            Self::Package(event) => f.debug_tuple("Package").field(event).finish(),
            Self::CapabilityProviderReady(_) => f.write_str("CapabilityProviderReady"),
        }
    }
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub struct DockActor {
    dock: Dock,
    rx: Receiver,
    broadcast: Option<BroadcastSender>,
    last_broadcast: u64,
}

impl DockActor {
    pub fn new(dock: Dock, rx: Receiver) -> Self {
        Self { dock, rx, broadcast: None, last_broadcast: 0 }
    }

    /// Sends a [`BroadcastEvent::DockChanged`] for every list this actor
    /// publishes. Unlike a [`crate::dock::DockObserver`] nothing is skipped.
    pub fn with_broadcast(mut self, tx: BroadcastSender) -> Self {
        self.last_broadcast = self.dock.snapshot().generation;
        self.broadcast = Some(tx);
        self
    }

    /// Runs until every sender is gone. A dock that can no longer fill its
    /// slots is unusable, so that error ends the actor.
    pub async fn run(mut self) -> Result<(), DockError> {
        while let Some((span, event)) = self.rx.recv().await {
            let _guard = span.enter();
            if let Err(err) = self.handle_event(event) {
                error!(%err, "dock actor stopping");
                return Err(err);
            }
            self.broadcast_changes();
        }
        debug!("dock actor channel closed");
        Ok(())
    }

    #[instrument(name = "dock::handle_event", skip(self))]
    fn handle_event(&mut self, event: Event) -> Result<(), DockError> {
        match event {
            Event::AppLaunched(component) => {
                self.dock.add_or_refresh_dynamic(&component)?;
            }
            Event::TaskMovedToFront(task) => self.handle_task_moved_to_front(&task)?,
            Event::PinItem(id) => {
                self.dock.pin_by_id(id)?;
            }
            Event::PinSlot(slot) => {
                if let Some(id) = self.id_at(slot) {
                    self.dock.pin_by_id(id)?;
                }
            }
            Event::PinComponent { component, index } => {
                self.dock.pin_by_identity(&component, index)?;
            }
            Event::UnpinItem(id) => {
                self.dock.unpin_by_id(id)?;
            }
            Event::UnpinSlot(slot) => {
                if let Some(id) = self.id_at(slot) {
                    self.dock.unpin_by_id(id)?;
                }
            }
            Event::UnpinComponent(component) => {
                self.dock.unpin_by_identity(&component)?;
            }
            Event::Action { action, component } => match action.parse::<DockAction>() {
                Ok(action) => self.handle_action(action, &component)?,
                Err(_) => warn!(%action, %component, "unknown dock action; dropping"),
            },
            Event::Package(event) => match event.effect() {
                PackageEffect::Remove(package) => {
                    self.dock.remove_by_package(package)?;
                }
                PackageEffect::Add(package) => self.dock.add_package(package)?,
                PackageEffect::Ignore => debug!(?event, "package event needs no dock change"),
            },
            Event::CapabilityProviderReady(capability) => {
                self.dock.refresh_capability_flags(capability)?;
            }
        }
        Ok(())
    }

    fn id_at(&self, slot: usize) -> Option<DockItemId> {
        let id = self.dock.with_engine(|engine| engine.slots().get(slot).map(|item| item.id));
        if id.is_none() {
            debug!(slot, "no dock item at slot");
        }
        id
    }

    fn broadcast_changes(&mut self) {
        let Some(tx) = &self.broadcast else { return };
        let snapshot = self.dock.snapshot();
        if snapshot.generation == self.last_broadcast {
            return;
        }
        self.last_broadcast = snapshot.generation;
        tx.send(BroadcastEvent::from(&snapshot));
    }

    fn handle_task_moved_to_front(&mut self, task: &RunningTask) -> Result<(), DockError> {
        if task.user_id != self.dock.user_id() {
            debug!(user_id = task.user_id, "task belongs to another user");
            return Ok(());
        }
        let Some(component) = task.component() else {
            debug!("task has no component");
            return Ok(());
        };
        self.dock.add_or_refresh_dynamic(&component)?;
        Ok(())
    }

    fn handle_action(&mut self, action: DockAction, component: &ComponentName) -> Result<(), DockError> {
        match action {
            DockAction::Launch => drop(self.dock.add_or_refresh_dynamic(component)?),
            DockAction::Pin => drop(self.dock.pin_by_identity(component, None)?),
            DockAction::Unpin => drop(self.dock.unpin_by_identity(component)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dock::engine::tests::{app, c, catalog_with, settings};
    use crate::model::ItemKind;
    use crate::sys::package::EnabledState;
    use crate::sys::platform::Platform;
    use crate::sys::task::{MEDIA_TEMPLATE_CLASS, MEDIA_TEMPLATE_PACKAGE};

    fn dock(capacity: usize, pinned: &[&str]) -> (Dock, Arc<crate::sys::catalog::Catalog>) {
        let catalog = catalog_with(6);
        let dock = Dock::new(&settings(capacity, pinned), Platform::from_shared(catalog.clone())).unwrap();
        (dock, catalog)
    }

    async fn run_events(dock: &Dock, events: Vec<Event>) -> Result<(), DockError> {
        let (tx, rx) = actor::channel();
        for event in events {
            tx.send(event);
        }
        drop(tx);
        DockActor::new(dock.clone(), rx).run().await
    }

    fn components(dock: &Dock) -> Vec<ComponentName> {
        dock.snapshot().items.into_iter().map(|item| item.component).collect()
    }

    #[tokio::test]
    async fn events_are_applied_in_order() {
        let (dock, _catalog) = dock(3, &[]);
        let start = dock.snapshot().generation;
        run_events(&dock, vec![
            Event::PinComponent { component: app(5), index: Some(0) },
            Event::AppLaunched(c("com.extra0/.Main")),
            Event::Action { action: "pin".into(), component: c("com.extra1/.Main") },
        ])
        .await
        .unwrap();

        let snapshot = dock.snapshot();
        assert_eq!(snapshot.generation, start + 3);
        assert_eq!(snapshot.items[0].component, app(5));
        assert!(components(&dock).contains(&c("com.extra1/.Main")));
        assert!(snapshot.items.iter().any(|item| item.component == c("com.extra1/.Main")
            && item.kind == ItemKind::Static));
    }

    #[tokio::test]
    async fn unknown_actions_are_dropped() {
        let (dock, _catalog) = dock(3, &[]);
        let before = dock.snapshot();
        run_events(&dock, vec![Event::Action {
            action: "shake".into(),
            component: c("com.extra0/.Main"),
        }])
        .await
        .unwrap();
        assert_eq!(dock.snapshot(), before);
    }

    #[tokio::test]
    async fn tasks_of_other_users_are_ignored() {
        let (dock, _catalog) = dock(3, &[]);
        run_events(&dock, vec![
            Event::TaskMovedToFront(RunningTask::new(11, c("com.extra0/.Main"))),
            Event::TaskMovedToFront(RunningTask::new(10, c("com.extra1/.Main"))),
        ])
        .await
        .unwrap();
        let components = components(&dock);
        assert!(!components.contains(&c("com.extra0/.Main")));
        assert!(components.contains(&c("com.extra1/.Main")));
    }

    #[tokio::test]
    async fn media_template_tasks_place_the_real_source() {
        let (dock, catalog) = dock(3, &[]);
        catalog.install(crate::sys::catalog::AppEntry::activity(c("com.radio/.Player"), "Radio"));
        let task = RunningTask {
            data: Some("custom:/com.radio/com.radio.Player".into()),
            ..RunningTask::new(10, ComponentName::new(MEDIA_TEMPLATE_PACKAGE, MEDIA_TEMPLATE_CLASS))
        };
        run_events(&dock, vec![Event::TaskMovedToFront(task)]).await.unwrap();
        assert!(components(&dock).contains(&c("com.radio/.Player")));
    }

    #[tokio::test]
    async fn package_events_follow_their_effect() {
        let (dock, _catalog) = dock(3, &["com.app0/.Main"]);
        run_events(&dock, vec![Event::Package(PackageEvent::Removed {
            package: "com.app0".into(),
            replacing: true,
        })])
        .await
        .unwrap();
        assert_eq!(components(&dock)[0], app(0));

        run_events(&dock, vec![Event::Package(PackageEvent::Changed {
            package: "com.app0".into(),
            state: EnabledState::DisabledUser,
        })])
        .await
        .unwrap();
        assert!(dock.snapshot().items.iter().all(|item| item.package() != "com.app0"));
        assert!(dock.with_engine(|engine| !engine.launcher_components().contains(&app(0))));

        run_events(&dock, vec![Event::Package(PackageEvent::Added { package: "com.app0".into() })])
            .await
            .unwrap();
        assert!(dock.with_engine(|engine| engine.launcher_components().contains(&app(0))));
    }

    #[tokio::test]
    async fn capability_provider_lifts_restrictions() {
        let (dock, catalog) = dock(3, &["com.app0/.Main"]);
        catalog.set_distraction_optimized(&app(0), true);
        assert!(dock.snapshot().items[0].restricted);
        run_events(&dock, vec![Event::CapabilityProviderReady(catalog.clone())]).await.unwrap();
        assert!(!dock.snapshot().items[0].restricted);
    }

    #[tokio::test]
    async fn exhaustion_stops_the_actor() {
        let catalog = catalog_with(3);
        let dock = Dock::new(&settings(3, &[]), Platform::from_shared(catalog.clone())).unwrap();
        let err = run_events(&dock, vec![
            Event::Package(PackageEvent::Removed { package: "com.app0".into(), replacing: false }),
            Event::AppLaunched(c("com.extra0/.Main")),
        ])
        .await
        .unwrap_err();
        assert!(matches!(err, DockError::CandidatesExhausted { capacity: 3, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn pin_slot_sees_earlier_events() {
        let (dock, _catalog) = dock(3, &[]);
        let evicted = dock.with_engine(|engine| engine.slots().get(0).unwrap().id);
        run_events(&dock, vec![Event::AppLaunched(c("com.extra0/.Main")), Event::PinSlot(0)])
            .await
            .unwrap();

        let first = &dock.snapshot().items[0];
        assert_ne!(first.id, evicted);
        assert_eq!(first.component, c("com.extra0/.Main"));
        assert_eq!(first.kind, ItemKind::Static);
    }

    #[tokio::test]
    async fn unpin_slot_clears_current_occupant() {
        let (dock, _catalog) = dock(3, &["com.app0/.Main"]);
        let start = dock.snapshot().generation;
        run_events(&dock, vec![Event::UnpinSlot(0), Event::UnpinSlot(7)]).await.unwrap();
        let snapshot = dock.snapshot();
        assert_eq!(snapshot.generation, start + 1);
        assert_eq!(snapshot.items[0].kind, ItemKind::Dynamic);
    }

    #[tokio::test]
    async fn every_publish_is_broadcast_once() {
        let (dock, _catalog) = dock(3, &[]);
        let start = dock.snapshot().generation;
        let (tx, rx) = actor::channel();
        let (broadcast_tx, mut broadcast_rx) = actor::channel();
        for event in [
            Event::AppLaunched(c("com.extra0/.Main")),
            Event::Action { action: "shake".into(), component: c("com.extra1/.Main") },
            Event::Package(PackageEvent::Removed { package: "com.app0".into(), replacing: true }),
            Event::AppLaunched(c("com.extra1/.Main")),
            Event::AppLaunched(c("com.extra2/.Main")),
        ] {
            tx.send(event);
        }
        drop(tx);
        DockActor::new(dock.clone(), rx).with_broadcast(broadcast_tx).run().await.unwrap();

        let mut generations = Vec::new();
        while let Ok((_, event)) = broadcast_rx.try_recv() {
            match event {
                BroadcastEvent::DockChanged { generation, items } => {
                    assert_eq!(items.len(), 3);
                    generations.push(generation);
                }
                other => panic!("unexpected broadcast {other:?}"),
            }
        }
        assert_eq!(generations, vec![start + 1, start + 2, start + 3]);
        assert_eq!(dock.snapshot().generation, start + 3);
    }

    #[test]
    fn actions_parse_by_name() {
        assert_eq!("launch".parse(), Ok(DockAction::Launch));
        assert_eq!("unpin".parse(), Ok(DockAction::Unpin));
        assert!("shake".parse::<DockAction>().is_err());
    }
}
