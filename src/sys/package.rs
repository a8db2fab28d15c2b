use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Component enabled state reported with a package change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnabledState {
    Default,
    Enabled,
    Disabled,
    DisabledUser,
    DisabledUntilUsed,
}

impl EnabledState {
    pub fn is_disabled(self) -> bool { matches!(self, Self::Disabled | Self::DisabledUser) }
}

/// Install state changes for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageEvent {
    Removed {
        package: String,
        /// Set while an update replaces the package; it comes straight back.
        #[serde(default)]
        replacing: bool,
    },
    Changed {
        package: String,
        state: EnabledState,
    },
    Added {
        package: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageEffect<'a> {
    Remove(&'a str),
    Add(&'a str),
    Ignore,
}

impl PackageEvent {
    /// What the dock does about this event.
    pub fn effect(&self) -> PackageEffect<'_> {
        match self {
            Self::Removed { replacing: true, .. } => PackageEffect::Ignore,
            Self::Removed { package, .. } => PackageEffect::Remove(package),
            Self::Changed { package, state } if state.is_disabled() => PackageEffect::Remove(package),
            Self::Changed { .. } => PackageEffect::Ignore,
            Self::Added { package } => PackageEffect::Add(package),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn replacing_removal_is_ignored() {
        let event = PackageEvent::Removed { package: "com.maps".into(), replacing: true };
        assert_eq!(event.effect(), PackageEffect::Ignore);
        let event = PackageEvent::Removed { package: "com.maps".into(), replacing: false };
        assert_eq!(event.effect(), PackageEffect::Remove("com.maps"));
    }

    #[test]
    fn only_disabling_changes_remove() {
        let change = |state| PackageEvent::Changed { package: "com.maps".into(), state };
        assert_eq!(change(EnabledState::Disabled).effect(), PackageEffect::Remove("com.maps"));
        assert_eq!(change(EnabledState::DisabledUser).effect(), PackageEffect::Remove("com.maps"));
        assert_eq!(change(EnabledState::DisabledUntilUsed).effect(), PackageEffect::Ignore);
        assert_eq!(change(EnabledState::Enabled).effect(), PackageEffect::Ignore);
    }

    #[test]
    fn parses_from_json() {
        let event: PackageEvent =
            serde_json::from_str(r#"{"kind":"changed","package":"com.maps","state":"disabled_user"}"#)
                .unwrap();
        assert_eq!(event, PackageEvent::Changed {
            package: "com.maps".into(),
            state: EnabledState::DisabledUser
        });
        let event: PackageEvent = serde_json::from_str(r#"{"kind":"removed","package":"com.maps"}"#).unwrap();
        assert_eq!(event.effect(), PackageEffect::Remove("com.maps"));
        assert_eq!("disabled_until_used".parse(), Ok(EnabledState::DisabledUntilUsed));
    }
}
