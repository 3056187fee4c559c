//! # Column Import Pipeline
//!
//! This crate provides the pipeline-facing components for importing rows
//! from a column-family store into a search index.
//!
//! ## Architecture
//!
//! 1. **Source**: `ColumnRowSource` owns the store connection and table
//!    handle and turns a scan into a lazy stream of flat records
//! 2. **Processor**: `EntityProcessor` pulls records from a data source one
//!    row at a time for the indexer

pub mod errors;
pub mod processor;
pub mod source;

pub use errors::ImportError;
pub use processor::EntityProcessor;
pub use source::{ColumnRowSource, DataSource, RowStream, SourceStatus};
