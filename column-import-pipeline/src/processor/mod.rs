//! Processor module for the import pipeline.
//!
//! Pulls rows from a data source one at a time for the indexer.

mod entity_processor;

pub use entity_processor::EntityProcessor;
