//! # codesketch
//!
//! Heuristic structure and relation diagrams for multi-language source trees.
//!
//! codesketch reads source files as plain text and recovers an approximate
//! picture of them with per-language regular-expression rules: declared
//! symbols, import/export edges between files, and intra-file relationships
//! such as inheritance and method ownership. Results are rendered as ASCII
//! tree diagrams.
//!
//! ## Reports
//!
//! - **Directory**: filesystem tree with box-drawing connectors
//! - **Code**: per-file listing of declared constructs grouped by kind
//! - **Relation**: cross-file dependencies, symbol usage and use graph
//!
//! ## Supported Languages
//!
//! Python, JavaScript, TypeScript, Rust, Java, C, C++, C#. Project manifests
//! (package.json, Cargo.toml, pom.xml, go.mod, Dockerfile, ...) are read by a
//! dedicated manifest parser.

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;
