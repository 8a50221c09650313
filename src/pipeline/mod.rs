//! Pipeline stages for PDF-to-HTML conversion.
//!
//! Each submodule implements exactly one transformation step and is tested
//! on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ walker ──▶ fonts ──▶ emit
//! (path)    (layout    (baseline) (html + client)
//!            nodes)
//! ```
//!
//! 1. [`input`]: validate the local path and derive the default output path
//! 2. [`walker`]: flatten layout nodes into paragraphs and images; text goes
//!    through [`clean`], images through [`encode`]
//! 3. [`fonts`]: character-weighted histogram and baseline selection
//! 4. [`emit`]: build the document as an html5ever DOM and attach the
//!    reader from [`client`]

pub mod clean;
pub mod client;
pub mod emit;
pub mod encode;
pub mod fonts;
pub mod input;
pub mod walker;
