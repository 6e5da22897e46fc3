pub mod catalog;
pub mod category;
pub mod series;

pub use catalog::{Catalog, CatalogEntry, GroupMap, DEFAULT_GROUP};
pub use category::LogicalCategory;
pub use series::{SeriesName, SeriesRecord, ShowGroup, ShowSummary};
