//! ASCII renderers for the three reports.
//!
//! Each formatter turns analyzer output into newline-joined text and can
//! write it straight to a file.

pub mod code;
pub mod directory;
pub mod relation;

pub use code::CodeFormatter;
pub use directory::DirectoryFormatter;
pub use relation::RelationFormatter;

/// Connector for a child entry.
pub(crate) const BRANCH: &str = "├── ";
/// Connector for the last child of a level, and for every listed item.
pub(crate) const LAST_BRANCH: &str = "└── ";
