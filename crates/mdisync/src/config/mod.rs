pub mod loader;
pub mod schema;

pub use loader::{load_class_map, load_config, load_config_from_str};
pub use schema::{ClassMapping, ImportConfig, NamingConfig, ProjectConfig};
