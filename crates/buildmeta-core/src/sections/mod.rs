//! Section taxonomy: which fact renders where.

pub mod catalog;
pub mod classify;
pub mod selected;

pub use catalog::{Section, SectionCatalog};
pub use classify::{ClassifiedEntry, ClassifiedSection, Classifier};
pub use selected::{PropertySource, SelectedProperty};
