//! HTTP handlers

pub mod images;
