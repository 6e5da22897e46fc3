pub mod catalog_builder;
pub mod catalog_source;
pub mod classifier;
pub mod hierarchy;
pub mod m3u_parser;
pub mod metrics;
pub mod normalizer;
