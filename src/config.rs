//! JSON configuration file.
//!
//! ```json
//! {
//!   "nonReadableTags": ["nav", "head", "style", "script", "footer", "aside"],
//!   "defaultHighlightClass": "user-highlight",
//!   "highlightClasses": { "comment": "hl-comment" },
//!   "diagnosticAttributes": true,
//!   "wrapDocument": false,
//!   "strategy": "auto"
//! }
//! ```
//!
//! Every key is optional.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::NonReadableTags;
use crate::convert::ConvertOptions;
use crate::error::{Error, Result};
use crate::reconstruct::{DEFAULT_HIGHLIGHT_CLASS, HighlightStyles, ReconstructOptions, Strategy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    pub non_readable_tags: NonReadableTags,
    pub default_highlight_class: String,
    pub highlight_classes: BTreeMap<String, String>,
    pub diagnostic_attributes: bool,
    pub wrap_document: bool,
    pub strategy: Strategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            non_readable_tags: NonReadableTags::default(),
            default_highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            highlight_classes: BTreeMap::new(),
            diagnostic_attributes: true,
            wrap_document: false,
            strategy: Strategy::Auto,
        }
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| {
            Error::Config(format!("failed reading `{}`: {error}", path.display()))
        })?;
        let config = Self::from_json(&content)
            .map_err(|error| Error::Config(format!("`{}`: {error}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|error| Error::Config(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let classes = std::iter::once(&self.default_highlight_class)
            .chain(self.highlight_classes.values());
        for class in classes {
            if class.trim().is_empty() {
                return Err(Error::Config("highlight class must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            non_readable: self.non_readable_tags.clone(),
        }
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            highlight: HighlightStyles {
                default_class: self.default_highlight_class.clone(),
                classes: self.highlight_classes.clone(),
            },
            diagnostic_attributes: self.diagnostic_attributes,
            wrap_document: self.wrap_document,
            strategy: self.strategy,
        }
    }
}
