//! Export boundary
//!
//! The export layer receives exactly two inputs: a finished tree and the
//! metamodel built independently from the destination type hierarchy. This
//! module provides the JSON rendition of the tree side; the metamodel types
//! serialize themselves via serde.

pub mod json;

pub use json::{node_to_json, result_to_json};
