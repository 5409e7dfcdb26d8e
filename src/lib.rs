//! Deterministic import sorting for Python source files.
//!
//! The pipeline runs in fixed stages over each file:
//!
//! 1. **Extract** ([`parse`]): locate the contiguous import region near the
//!    top of the buffer and parse it into statements, preserving comments
//!    and skip directives.
//! 2. **Classify** ([`classify`]): assign each statement to exactly one
//!    section (future, standard library, third party, first party, local).
//! 3. **Order** ([`order`]): merge, split, and sort statements per section
//!    under a deterministic total order.
//! 4. **Render** ([`render`], [`wrap`]): emit physical lines, wrapping
//!    overlong statements per the configured layout.
//! 5. **Splice** ([`format`]): replace the original region, leaving every
//!    other byte of the file untouched.
//!
//! [`format::sort_source`] drives the stages for one buffer; [`files`] adds
//! discovery, parallel execution, and in-place rewriting on top.
//!
//! ## Guarantees
//!
//! - Idempotent: sorting already-sorted output changes nothing.
//! - Content-preserving: every import in the input appears in the output;
//!   only exact duplicates collapse.
//! - Deterministic: output depends only on buffer content and configuration,
//!   never on scheduling or filesystem order.

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod files;
pub mod format;
pub mod order;
pub mod output;
pub mod parse;
pub mod render;
pub mod stdlib;
pub mod wrap;

pub use classify::SectionResolver;
pub use config::{Config, PythonVersion, SortOrder, WrapMode};
pub use error::{ExitStatus, SortError};
pub use format::{sort_source, SortOutcome};
