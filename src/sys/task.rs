use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::ComponentName;

/// Package and class of the template activity that hosts media sources. Tasks
/// started on it name the real media source in their data URI.
pub const MEDIA_TEMPLATE_PACKAGE: &str = "com.android.car.media";
pub const MEDIA_TEMPLATE_CLASS: &str = "com.android.car.media.MediaActivity";
const MEDIA_DATA_SCHEME: &str = "custom";

pub type UserId = u32;

/// One entry of a running-task snapshot, most recent first in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTask {
    pub user_id: UserId,
    #[serde(default)]
    pub base_activity: Option<ComponentName>,
    #[serde(default)]
    pub base_intent_component: Option<ComponentName>,
    #[serde(default)]
    pub data: Option<String>,
}

impl RunningTask {
    pub fn new(user_id: UserId, base_activity: ComponentName) -> Self {
        Self {
            user_id,
            base_activity: Some(base_activity),
            base_intent_component: None,
            data: None,
        }
    }

    /// Component the dock should show for this task. Tasks running inside the
    /// media template resolve to the media source they were started for.
    pub fn component(&self) -> Option<ComponentName> {
        let component = self.base_activity.as_ref().or(self.base_intent_component.as_ref())?;
        if is_media_template(component) {
            return self.media_component();
        }
        Some(component.clone())
    }

    fn media_component(&self) -> Option<ComponentName> {
        let Some(data) = self.data.as_deref() else {
            debug!("media task has no data attached");
            return None;
        };
        let Some((scheme, ssp)) = data.split_once(':') else {
            debug!(data, "media task data has no scheme");
            return None;
        };
        if scheme != MEDIA_DATA_SCHEME {
            debug!(scheme, "media task data scheme does not match");
            return None;
        }
        let ssp = ssp.strip_prefix('/').unwrap_or(ssp);
        match ssp.parse() {
            Ok(component) => Some(component),
            Err(e) => {
                debug!("media task data is not a component: {e}");
                None
            }
        }
    }
}

pub fn is_media_template(component: &ComponentName) -> bool {
    component.package() == MEDIA_TEMPLATE_PACKAGE && component.class() == MEDIA_TEMPLATE_CLASS
}
