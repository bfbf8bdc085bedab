//! # ontolink-core
//!
//! Core types for ontolink: the data shared between annotation readers,
//! the label index, and the linker.
//!
//! This crate provides:
//! - **Categories**: `SemanticCategory`, the closed set of mention categories
//! - **Annotations**: `Annotation`, `AnnotatedDoc`, `AnnotationSource`
//! - **Errors**: `Error`, `Result`
//!
//! Nothing here performs I/O or linking; the `ontolink` crate builds on
//! these types.

#![warn(missing_docs)]

pub mod annotation;
pub mod category;
pub mod error;

pub use annotation::{AnnotatedDoc, Annotation, AnnotationSource, Mention};
pub use category::SemanticCategory;
pub use error::{Error, Result};
