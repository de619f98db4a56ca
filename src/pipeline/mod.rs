//! Pipeline stages for chat exports.
//!
//! Each submodule implements exactly one transformation step, independently
//! testable. The orchestrator in [`crate::export`] sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! records ──▶ conversations ──▶ ┐
//! (serde_json)  (Shape)          │
//! html ─────────────────────────┼──▶ DocumentSession ──▶ render
//! (regex passes)                 │                       (pdfium)
//! images ───────────────────────┘
//! (image decode)
//! ```
//!
//! 1. [`records`]: read the conversations file into a JSON tree
//! 2. [`conversations`]: resolve the top-level shape and type each record
//! 3. [`timestamp`]: epoch seconds to display text for speaker headers
//! 4. [`html`]: flatten the HTML export to plain text
//! 5. [`images`]: list, decode and place image files
//! 6. [`render`]: serialise the laid-out document to PDF

pub mod conversations;
pub mod html;
pub mod images;
pub mod records;
pub mod render;
pub mod timestamp;
