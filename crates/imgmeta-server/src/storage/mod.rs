//! Storage layer
//!
//! One SQLite table of image metadata, nothing else.

pub mod db;

pub use db::{Database, ImageRecord};
