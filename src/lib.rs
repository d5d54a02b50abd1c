//! # LimberJson
//!
//! A fault-tolerant scanner, parser, formatter and editor for JSON with
//! JavaScript-style extensions ("JSONC"): line and block comments and optional
//! trailing commas.
//!
//! The crate is built for tools that read, navigate and minimally rewrite
//! user-edited configuration files while preserving comments and layout:
//!
//! - The [`Scanner`] tokenizes text with precise offset/line/column tracking
//!   and attaches recoverable [`ScanError`]s to tokens instead of failing.
//! - [`parse`], [`parse_tree`], [`visit`] and [`get_location`] drive the
//!   scanner to produce a plain [`Value`], a span-preserving [`JsonTree`],
//!   a stream of [`JsonVisitor`] callbacks, or the structural [`Location`]
//!   of an offset. Recoverable problems are collected as [`ParseError`]s and
//!   never abort parsing.
//! - [`format`] emits a minimal list of whitespace [`Edit`]s, with an optional
//!   keep-lines mode that respects the author's line breaks.
//! - [`modify`] computes the edits that insert, replace or remove a value at a
//!   [`JsonPath`], re-indenting the inserted fragment to match its
//!   surroundings.
//! - [`apply_edits`] applies an edit list to a document.
//!
//! ## Quick start
//!
//! ```rust
//! use limberjson::{parse, ParseOptions};
//!
//! let text = r#"{
//!     // enabled by the ops team
//!     "enabled": true,
//!     "retries": 3
//! }"#;
//!
//! let mut errors = Vec::new();
//! let config = parse(text, &mut errors, &ParseOptions::default()).unwrap();
//! assert!(errors.is_empty());
//! assert_eq!(config["retries"], 3);
//! ```
//!
//! ## Editing while keeping comments
//!
//! ```rust
//! use limberjson::{apply_edits, modify, FormattingOptions, ModificationOptions, PathSegment};
//!
//! let text = "{\n  // retry budget\n  \"retries\": 3\n}";
//! let options = ModificationOptions {
//!     formatting_options: FormattingOptions {
//!         tab_size: 2,
//!         eol: Some("\n".to_string()),
//!         ..FormattingOptions::default()
//!     },
//!     ..ModificationOptions::default()
//! };
//!
//! let edits = modify(text, &[PathSegment::Name("retries".into())], Some(5.into()), &options).unwrap();
//! let updated = apply_edits(text, &edits).unwrap();
//! assert_eq!(updated, "{\n  // retry budget\n  \"retries\": 5\n}");
//! ```
//!
//! All offsets, lengths and columns in the public API are UTF-8 byte based and
//! refer to the original document; lines and columns are 0-based. Every
//! operation is synchronous, allocation-bounded and free of shared state:
//! callers may run any number of operations in parallel as long as each owns
//! its own [`Scanner`].

mod edit;
mod error;
mod formatter;
mod model;
mod options;
mod parser;
mod scanner;
mod tree;

pub use crate::edit::{apply_edits, modify, remove_value, set_value};
pub use crate::error::LimberJsonError;
pub use crate::formatter::format;
pub use crate::model::{
    Edit, JsonPath, Location, NodeInfo, NodeType, ParseError, ParseErrorCode, PathSegment,
    ScanError, SyntaxKind, TextRange, TokenSpan,
};
pub use crate::options::{FormattingOptions, ModificationOptions, ParseOptions};
pub use crate::parser::{get_location, parse, visit, JsonVisitor};
pub use crate::scanner::{strip_comments, strip_comments_with, Scanner};
pub use crate::tree::{parse_tree, JsonTree, Node, NodeId};

pub use serde_json::Value;
