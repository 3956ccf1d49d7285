//! Filename classification: discipline/table/revision from the document
//! code and document class from the MDI prefix map.

pub mod class_map;
pub mod code;

pub use class_map::{ClassMapper, FolderClassCache};
pub use code::{parse_revision, Classification, CodeClassifier, DisciplineMatch};
