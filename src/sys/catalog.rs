use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::platform::{
    CapabilityProvider, LauncherCandidateProvider, MediaCapabilityProvider, MetadataProvider,
    TaskSnapshotProvider,
};
use super::task::RunningTask;
use crate::model::{AppMetadata, ComponentName, IconRef};

/// One installed component as the catalog knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppEntry {
    pub component: ComponentName,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub icon_color: Option<u32>,
    /// Shows up in the launcher and may be recommended for empty slots.
    #[serde(default = "yes")]
    pub launcher: bool,
    /// A media browser service rather than an activity.
    #[serde(default)]
    pub media: bool,
    #[serde(default)]
    pub distraction_optimized: bool,
}

fn yes() -> bool { true }

impl AppEntry {
    pub fn activity(component: ComponentName, label: impl Into<String>) -> Self {
        Self {
            icon: format!("icon:{}", component.package()),
            component,
            label: label.into(),
            icon_color: None,
            launcher: true,
            media: false,
            distraction_optimized: false,
        }
    }

    pub fn media_service(component: ComponentName, label: impl Into<String>) -> Self {
        Self {
            launcher: false,
            media: true,
            ..Self::activity(component, label)
        }
    }
}

/// Thread-safe in-memory stand-in for the platform's package and task
/// services. Package feeds mutate it while the dock reads it.
#[derive(Debug, Default)]
pub struct Catalog {
    apps: DashMap<ComponentName, AppEntry>,
    tasks: RwLock<Vec<RunningTask>>,
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    pub fn with_apps(apps: impl IntoIterator<Item = AppEntry>) -> Self {
        let catalog = Self::new();
        for app in apps {
            catalog.install(app);
        }
        catalog
    }

    pub fn shared(self) -> Arc<Self> { Arc::new(self) }

    pub fn install(&self, app: AppEntry) {
        debug!(component = %app.component, "catalog install");
        self.apps.insert(app.component.clone(), app);
    }

    /// Drops every component of `package`; returns how many were removed.
    pub fn uninstall(&self, package: &str) -> usize {
        let before = self.apps.len();
        self.apps.retain(|component, _| !component.is_in_package(package));
        before - self.apps.len()
    }

    pub fn set_distraction_optimized(&self, component: &ComponentName, optimized: bool) {
        if let Some(mut entry) = self.apps.get_mut(component) {
            entry.distraction_optimized = optimized;
        }
    }

    pub fn set_tasks(&self, tasks: Vec<RunningTask>) { *self.tasks.write() = tasks; }

    /// Puts `task` at the front of the snapshot, replacing any earlier task
    /// with the same component.
    pub fn move_task_to_front(&self, task: RunningTask) {
        let mut tasks = self.tasks.write();
        let component = task.component();
        tasks.retain(|t| t.component() != component || t.user_id != task.user_id);
        tasks.insert(0, task);
    }

    fn components_where(
        &self,
        package: Option<&str>,
        keep: impl Fn(&AppEntry) -> bool,
    ) -> Vec<ComponentName> {
        let mut components: Vec<_> = self
            .apps
            .iter()
            .filter(|entry| package.is_none_or(|p| entry.key().is_in_package(p)))
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        components.sort();
        components
    }
}

impl MetadataProvider for Catalog {
    fn resolve(&self, component: &ComponentName, is_media: bool) -> Option<AppMetadata> {
        let entry = self.apps.get(component)?;
        if entry.media != is_media {
            return None;
        }
        Some(AppMetadata {
            label: entry.label.clone(),
            icon: IconRef::new(entry.icon.as_str()),
            icon_color: entry.icon_color,
        })
    }
}

impl MediaCapabilityProvider for Catalog {
    fn media_components(&self, package: Option<&str>) -> Vec<ComponentName> {
        self.components_where(package, |entry| entry.media)
    }
}

impl LauncherCandidateProvider for Catalog {
    fn launcher_components(&self, package: Option<&str>) -> Vec<ComponentName> {
        self.components_where(package, |entry| entry.launcher && !entry.media)
    }
}

impl TaskSnapshotProvider for Catalog {
    fn current_tasks(&self) -> Vec<RunningTask> { self.tasks.read().clone() }
}

impl CapabilityProvider for Catalog {
    fn is_distraction_optimized(&self, component: &ComponentName) -> bool {
        self.apps.get(component).is_some_and(|entry| entry.distraction_optimized)
    }
}
