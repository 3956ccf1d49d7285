//! Builders for configs and report sheets.

#![allow(dead_code)]

use mdisync::config::ClassMapping;
use mdisync::importer::{Cell, SheetRow, SheetTable};
use mdisync::ProjectConfig;

/// Builder for `ProjectConfig` instances.
pub struct ConfigBuilder {
    config: ProjectConfig,
}

impl ConfigBuilder {
    /// Project conventions with empty lookup tables.
    pub fn new() -> Self {
        Self {
            config: ProjectConfig::default(),
        }
    }

    /// Map a lookup character to `[table, description, discipline]`.
    pub fn discipline(mut self, code: &str, table: &str, description: &str, discipline: &str) -> Self {
        self.config.discipline_map.insert(
            code.to_string(),
            vec![
                table.to_string(),
                description.to_string(),
                discipline.to_string(),
            ],
        );
        self
    }

    /// Map a document-number prefix to a class.
    pub fn class(mut self, prefix: &str, class: &str) -> Self {
        self.config
            .class_map
            .insert(prefix.to_string(), ClassMapping::Single(class.to_string()));
        self
    }

    pub fn reconcile(mut self, enabled: bool) -> Self {
        self.config.reconcile_placeholders = enabled;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.import.batch_size = size;
        self
    }

    pub fn build(self) -> ProjectConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The lookup tables used across the scenarios.
pub fn project_config() -> ConfigBuilder {
    ConfigBuilder::new()
        .discipline("A", "Piping", "Piping Docs", "MECH")
        .discipline("E", "Electrical", "Electrical Docs", "ELEC")
        .class("TF1-2A", "Class 1")
        .class("TF1-2A19", "Class 2")
}

/// Builder for an already-read report sheet. Data rows are numbered from
/// 5, as in a report whose header sits below three presentation rows.
pub struct SheetBuilder {
    headers: Vec<String>,
    rows: Vec<SheetRow>,
}

impl SheetBuilder {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        let number = 5 + self.rows.len();
        self.rows.push(SheetRow { number, cells });
        self
    }

    /// A row of text cells; `""` is an empty cell.
    pub fn text_row(self, values: &[&str]) -> Self {
        let cells = values.iter().map(|v| Cell::from(*v)).collect();
        self.row(cells)
    }

    pub fn build(self) -> SheetTable {
        SheetTable {
            headers: self.headers,
            rows: self.rows,
        }
    }
}
