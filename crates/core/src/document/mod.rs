//! PDF Document module - document structure, pages, and security.
//!
//! This module contains:
//! - `xref` - cross-reference sections, the merged table and recovery scan
//! - `catalog` - object resolution and caching (PDFDocument)
//! - `page` - page tree walk and inherited attributes (PDFPage)
//! - `security` - standard security handler (RC4, AES-128, AES-256)

pub mod catalog;
pub mod page;
pub mod security;
pub mod xref;

// Re-export main types for convenience
pub use catalog::{DEFAULT_CACHE_CAPACITY, PDFDocument};
pub use page::{DEFAULT_MEDIABOX, PDFPage};
pub use security::{PASSWORD_PADDING, StandardSecurityHandler, create_security_handler};
pub use xref::{XRefEntry, XRefTable};
