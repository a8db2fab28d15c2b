//! Contracts the dock needs from the platform it runs on. All lookups are
//! synchronous in-memory calls; implementations must not block on I/O.

use std::sync::Arc;

use super::task::RunningTask;
use crate::model::{AppMetadata, ComponentName};

pub trait MetadataProvider: Send + Sync {
    /// Label and icon for `component`, or `None` if it is not installed.
    /// Media components are looked up among services instead of activities.
    fn resolve(&self, component: &ComponentName, is_media: bool) -> Option<AppMetadata>;
}

pub trait MediaCapabilityProvider: Send + Sync {
    /// Media service components, restricted to `package` when given.
    fn media_components(&self, package: Option<&str>) -> Vec<ComponentName>;
}

pub trait TaskSnapshotProvider: Send + Sync {
    /// Running tasks across all users, most recent first.
    fn current_tasks(&self) -> Vec<RunningTask>;
}

pub trait LauncherCandidateProvider: Send + Sync {
    /// Launchable components, restricted to `package` when given.
    fn launcher_components(&self, package: Option<&str>) -> Vec<ComponentName>;
}

pub trait CapabilityProvider: Send + Sync {
    fn is_distraction_optimized(&self, component: &ComponentName) -> bool;
}

/// The set of providers a dock is built against.
#[derive(Clone)]
pub struct Platform {
    pub metadata: Arc<dyn MetadataProvider>,
    pub media: Arc<dyn MediaCapabilityProvider>,
    pub tasks: Arc<dyn TaskSnapshotProvider>,
    pub launcher: Arc<dyn LauncherCandidateProvider>,
}

impl Platform {
    /// Uses one object for every provider role.
    pub fn from_shared<P>(provider: Arc<P>) -> Self
    where
        P: MetadataProvider
            + MediaCapabilityProvider
            + TaskSnapshotProvider
            + LauncherCandidateProvider
            + 'static,
    {
        Self {
            metadata: provider.clone(),
            media: provider.clone(),
            tasks: provider.clone(),
            launcher: provider,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
