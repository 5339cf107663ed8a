use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque name of a content section, carried in the URL fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A navigation anchor in the persistent page shell, statically bound to one
/// section. The target list is read-only after shell construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTarget {
    pub section: SectionId,
    pub label: String,
}

impl NavTarget {
    pub fn new(section: impl Into<SectionId>, label: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            label: label.into(),
        }
    }
}

/// Conventional request path for a section's fragment document.
pub fn section_path(section: &SectionId) -> String {
    format!("/sections/{}/index.html", section.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_path_follows_convention() {
        assert_eq!(
            section_path(&SectionId::from("pricing")),
            "/sections/pricing/index.html"
        );
    }
}
