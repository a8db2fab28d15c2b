use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Identifies one launchable application component: the owning package plus
/// the activity or service class inside it. Serialized in `package/class` form.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ComponentName {
    package: String,
    class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseComponentError {
    #[error("component `{0}` is missing the `/` separator")]
    MissingSeparator(String),
    #[error("component `{0}` has an empty package")]
    EmptyPackage(String),
    #[error("component `{0}` has an empty class")]
    EmptyClass(String),
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self { package: package.into(), class: class.into() }
    }

    pub fn package(&self) -> &str { &self.package }

    pub fn class(&self) -> &str { &self.class }

    pub fn is_in_package(&self, package: &str) -> bool { self.package == package }

    /// Flattened `package/class` form. Classes inside the package are not
    /// shortened, so the output always parses back to the same component.
    pub fn flatten(&self) -> String { format!("{}/{}", self.package, self.class) }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

impl FromStr for ComponentName {
    type Err = ParseComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((package, class)) = s.split_once('/') else {
            return Err(ParseComponentError::MissingSeparator(s.to_string()));
        };
        if package.is_empty() {
            return Err(ParseComponentError::EmptyPackage(s.to_string()));
        }
        if class.is_empty() || class == "." {
            return Err(ParseComponentError::EmptyClass(s.to_string()));
        }
        // `.Foo` is shorthand for a class living directly in the package.
        let class = if class.starts_with('.') {
            format!("{package}{class}")
        } else {
            class.to_string()
        };
        Ok(Self::new(package, class))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_full_class_name() {
        let c: ComponentName = "com.example.maps/com.example.maps.MainActivity".parse().unwrap();
        assert_eq!(c.package(), "com.example.maps");
        assert_eq!(c.class(), "com.example.maps.MainActivity");
    }

    #[test]
    fn expands_short_class_name() {
        let c: ComponentName = "com.example.maps/.MainActivity".parse().unwrap();
        assert_eq!(c.class(), "com.example.maps.MainActivity");
        assert_eq!(c.flatten(), "com.example.maps/com.example.maps.MainActivity");
    }

    #[test]
    fn rejects_malformed_components() {
        assert_eq!(
            "com.example.maps".parse::<ComponentName>(),
            Err(ParseComponentError::MissingSeparator("com.example.maps".into()))
        );
        assert!(matches!(
            "/Main".parse::<ComponentName>(),
            Err(ParseComponentError::EmptyPackage(_))
        ));
        assert!(matches!(
            "com.example/".parse::<ComponentName>(),
            Err(ParseComponentError::EmptyClass(_))
        ));
    }

    #[test]
    fn serializes_as_flat_string() {
        let c = ComponentName::new("com.example.radio", "com.example.radio.Tuner");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"com.example.radio/com.example.radio.Tuner\"");
        let bad = serde_json::from_str::<ComponentName>("\"radio\"");
        assert!(bad.is_err());
    }
}
