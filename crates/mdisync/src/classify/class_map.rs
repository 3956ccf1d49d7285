use std::collections::HashMap;

use crate::config::ProjectConfig;
use crate::NOT_AVAILABLE;

/// Maps document-number prefixes to a document class.
///
/// Prefixes are tried longest first so that a specific prefix (`ABC`)
/// is never masked by a generic one (`AB`). Equal-length prefixes keep
/// the order of the configuration map. A prefix mapped to `N/A` (or to
/// nothing) still takes part in the ordering and resolves to `N/A`.
#[derive(Debug, Clone)]
pub struct ClassMapper {
    prefixes: Vec<(String, Option<String>)>,
}

impl ClassMapper {
    pub fn new(config: &ProjectConfig) -> Self {
        let mut prefixes: Vec<(String, Option<String>)> = config
            .class_map
            .iter()
            .map(|(prefix, mapping)| (prefix.clone(), mapping.class().map(str::to_string)))
            .collect();
        // Stable sort keeps map order for ties.
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { prefixes }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    fn matching(&self, base_name: &str) -> Option<Option<&str>> {
        self.prefixes
            .iter()
            .find(|(prefix, _)| base_name.starts_with(prefix.as_str()))
            .map(|(_, class)| class.as_deref())
    }

    /// Class for the longest matching prefix, if any. A prefix mapped to
    /// no class yields `N/A`.
    pub fn lookup(&self, base_name: &str) -> Option<&str> {
        self.matching(base_name)
            .map(|class| class.unwrap_or(NOT_AVAILABLE))
    }

    /// Resolves the class for a file, consulting and feeding the folder cache.
    ///
    /// A prefix hit records the class for `folder`; a miss inherits the
    /// class most recently recorded for the same folder. A hit on an `N/A`
    /// prefix neither records nor inherits.
    pub fn resolve(
        &self,
        base_name: &str,
        folder: Option<&str>,
        cache: &mut FolderClassCache,
    ) -> String {
        match self.matching(base_name) {
            Some(Some(class)) => {
                if let Some(folder) = folder {
                    cache.record(folder, class);
                }
                class.to_string()
            }
            Some(None) => NOT_AVAILABLE.to_string(),
            None => folder
                .and_then(|f| cache.get(f))
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
        }
    }
}

/// Class observed per top-level folder during a single scan.
///
/// Lives only for the duration of one scan; never persisted.
#[derive(Debug, Default)]
pub struct FolderClassCache {
    classes: HashMap<String, String>,
}

impl FolderClassCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, folder: &str, class: &str) {
        self.classes.insert(folder.to_string(), class.to_string());
    }

    pub fn get(&self, folder: &str) -> Option<&str> {
        self.classes.get(folder).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
