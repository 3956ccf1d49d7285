use std::path::{Component, Path};

use regex::Regex;

use crate::config::NamingConfig;
use crate::error::ConfigError;
use crate::NOT_AVAILABLE;

/// Project naming conventions compiled for one scan.
#[derive(Debug, Clone)]
pub struct NamingRules {
    transmittal: Regex,
    transmittal_prefixes: Vec<String>,
    item_prefix: String,
    item_segment: usize,
    business_prefixes: Vec<String>,
}

impl NamingRules {
    pub fn new(naming: &NamingConfig) -> Result<Self, ConfigError> {
        let transmittal =
            Regex::new(&naming.transmittal_pattern).map_err(|e| ConfigError::InvalidPattern {
                name: "transmittal_pattern".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            transmittal,
            transmittal_prefixes: naming.transmittal_prefixes.clone(),
            item_prefix: naming.item_prefix.clone(),
            item_segment: naming.item_segment,
            business_prefixes: naming.business_prefixes.clone(),
        })
    }

    /// Transmittal number of the nearest folder between `dir` and `root`
    /// (both inclusive) whose name carries one, spaces removed.
    pub fn transmittal_for(&self, dir: &Path, root: &Path) -> String {
        for folder in dir.ancestors() {
            if let Some(name) = folder.file_name().and_then(|n| n.to_str()) {
                if let Some(caps) = self.transmittal.captures(name) {
                    let found = caps.get(1).or_else(|| caps.get(0));
                    if let Some(m) = found {
                        return m.as_str().replace(' ', "");
                    }
                }
            }
            if folder == root {
                break;
            }
        }
        NOT_AVAILABLE.to_string()
    }

    /// Transmittal cover files are not deliverables; only their revision
    /// is parsed.
    pub fn is_transmittal_file(&self, base_name: &str) -> bool {
        self.transmittal_prefixes
            .iter()
            .any(|p| base_name.starts_with(p.as_str()))
    }

    /// Item code: first three characters of the configured `-` segment,
    /// for names in the project numbering scheme.
    pub fn item_code(&self, base_name: &str) -> String {
        if !base_name.starts_with(&self.item_prefix) {
            return NOT_AVAILABLE.to_string();
        }
        base_name
            .split('-')
            .nth(self.item_segment)
            .map(|segment| segment.chars().take(3).collect::<String>())
            .filter(|item| item.chars().count() >= 2)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// The name itself when it already is a company document number.
    pub fn business_number(&self, base_name: &str) -> Option<String> {
        self.business_prefixes
            .iter()
            .any(|p| base_name.starts_with(p.as_str()))
            .then(|| base_name.to_string())
    }
}

/// First folder below `root` on the way to `dir`; `None` for `root` itself.
pub fn level_one_folder(dir: &Path, root: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    match relative.components().next()? {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    }
}
