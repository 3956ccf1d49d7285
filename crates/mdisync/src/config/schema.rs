use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Project configuration: lookup tables and naming conventions.
///
/// Built once at startup and handed by reference to the classifier,
/// mapper, scanner and importer. Nothing reads it from global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub version: String,
    /// Lookup character -> `[table, description, discipline]`.
    #[serde(default)]
    pub discipline_map: BTreeMap<String, Vec<String>>,
    /// Document-number prefix -> document class.
    #[serde(default)]
    pub class_map: BTreeMap<String, ClassMapping>,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub import: ImportConfig,
    /// Merge importer placeholders into scanned rows after every scan.
    #[serde(default)]
    pub reconcile_placeholders: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            discipline_map: BTreeMap::new(),
            class_map: BTreeMap::new(),
            naming: NamingConfig::default(),
            import: ImportConfig::default(),
            reconcile_placeholders: false,
        }
    }
}

/// A class-map value. Older mapping files store a list whose first entry
/// is the class; newer ones store the class directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassMapping {
    Single(String),
    List(Vec<String>),
}

impl ClassMapping {
    /// The class this mapping resolves to, if any.
    pub fn class(&self) -> Option<&str> {
        let value = match self {
            ClassMapping::Single(s) => Some(s.as_str()),
            ClassMapping::List(items) => items.first().map(String::as_str),
        };
        value.filter(|v| !v.is_empty() && *v != crate::NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_project_prefix")]
    pub project_prefix: String,
    #[serde(default = "default_lookup_offset")]
    pub lookup_offset: usize,
    #[serde(default = "default_transmittal_pattern")]
    pub transmittal_pattern: String,
    #[serde(default = "default_transmittal_prefixes")]
    pub transmittal_prefixes: Vec<String>,
    #[serde(default = "default_item_prefix")]
    pub item_prefix: String,
    #[serde(default = "default_item_segment")]
    pub item_segment: usize,
    #[serde(default = "default_business_prefixes")]
    pub business_prefixes: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_project_prefix() -> String {
    "TF1_2".to_string()
}

fn default_lookup_offset() -> usize {
    5
}

fn default_transmittal_pattern() -> String {
    r"(LSPET-TCPT-T- ?\w{2}-\d{4})".to_string()
}

fn default_transmittal_prefixes() -> Vec<String> {
    vec!["LSPET-TCPT-T-".to_string(), "TCPT-LSPET-T-".to_string()]
}

fn default_item_prefix() -> String {
    "TF1-2".to_string()
}

fn default_item_segment() -> usize {
    2
}

fn default_business_prefixes() -> Vec<String> {
    vec![
        "TF1-2".to_string(),
        "TCPT-".to_string(),
        "LSPET-".to_string(),
    ]
}

fn default_extensions() -> Vec<String> {
    ["pdf", "doc", "docx", "xls", "xlsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            project_prefix: default_project_prefix(),
            lookup_offset: default_lookup_offset(),
            transmittal_pattern: default_transmittal_pattern(),
            transmittal_prefixes: default_transmittal_prefixes(),
            item_prefix: default_item_prefix(),
            item_segment: default_item_segment(),
            business_prefixes: default_business_prefixes(),
            extensions: default_extensions(),
        }
    }
}

impl NamingConfig {
    /// Case-insensitive extension allow-list check.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Presentation rows above the header row.
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,
}

fn default_sheet_name() -> String {
    "MDI_DetailStatus".to_string()
}

fn default_skip_rows() -> usize {
    3
}

fn default_batch_size() -> usize {
    100
}

fn default_placeholder_prefix() -> String {
    "IMPORT_".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            skip_rows: default_skip_rows(),
            batch_size: default_batch_size(),
            placeholder_prefix: default_placeholder_prefix(),
        }
    }
}

impl ImportConfig {
    /// Synthetic primary key for a document known only from the report.
    pub fn placeholder_path(&self, company_doc_no: &str) -> String {
        format!("{}{}", self.placeholder_prefix, company_doc_no)
    }
}
