//! # standoff
//!
//! Converts HTML into a stand-off annotated document (a JDOM) and back.
//!
//! A JDOM keeps the source HTML byte-for-byte and describes it with two
//! offset-based views:
//!
//! - **marks**: headings, paragraphs, bold and italic spans
//! - **reading order**: the text runs a reader would consume, with navigation,
//!   scripts, styles, footers and the document head filtered out
//!
//! ## Quick Start
//!
//! ```
//! use standoff::{UserMark, html_to_jdom, jdom_to_html, jdom_to_text};
//!
//! let jdom = html_to_jdom("<nav>Home</nav><p>The fox <b>jumped</b>.</p>").unwrap();
//! assert_eq!(jdom_to_text(&jdom), "The fox jumped.");
//!
//! // Rebuild readable HTML with a caller-supplied highlight
//! let html = jdom_to_html(&jdom, &[UserMark::new(18, 24, "note")]);
//! assert!(!html.contains("Home"));
//! ```
//!
//! ## Storing documents
//!
//! ```
//! use standoff::{JdomStore, MemoryStore, SaveOutcome, html_to_jdom_with_url};
//!
//! let mut store = MemoryStore::new();
//! let jdom = html_to_jdom_with_url("<p>x</p>", "https://example.com/").unwrap();
//!
//! assert_eq!(store.save(&jdom).unwrap(), SaveOutcome::Inserted(0));
//! assert_eq!(store.save(&jdom).unwrap(), SaveOutcome::AlreadyStored(0));
//! ```

pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod jdom;
pub mod reconstruct;
pub mod source;
pub mod store;
pub mod util;
pub mod walker;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use classify::{MarkType, NonReadableTags};
pub use config::Config;
pub use convert::{ConvertOptions, Converter, html_to_jdom, html_to_jdom_with_url, jdom_to_text};
pub use error::{Error, Result};
pub use jdom::{Jdom, Mark, ReadingOrderEntry, UserMark};
pub use reconstruct::{
    HighlightStyles, ReconstructOptions, Reconstructor, Strategy, jdom_to_html,
};
pub use source::{HtmlSourceParser, SourceNode, SourceParser, SourceTree, Span};
pub use store::{FileStore, JdomStore, MemoryStore, SaveOutcome, StoredJdom};
