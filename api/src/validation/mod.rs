//! Input Validation Module
//!
//! This module holds the validation-rule engine for document submissions.
//!
//! # Overview
//!
//! 1. **Sanitizers** - pure normalizers (trim, whitespace collapse/strip,
//!    upper-casing, digit grouping)
//! 2. **Validators** - predicates over a single sanitized value
//! 3. **Rules** - one declarative rule set per document type
//! 4. **Aggregator** - runs a rule set, normalizing in place and collecting
//!    one error per failing field
//! 5. **Extractors** - `ValidatedDocument<D>`, which wires the above into
//!    Axum handlers
//!
//! # Usage
//!
//! ```ignore
//! pub async fn put_document<D: DocumentRoute>(
//!     document: ValidatedDocument<D>,
//! ) -> Json<DocumentPayload> {
//!     // payload is sanitized and validated
//!     Json(document.payload)
//! }
//! ```
//!
//! # Validation Error Response
//!
//! All fields are evaluated; only the first failure is returned, as a
//! plain-text 400:
//!
//! ```text
//! HTTP/1.1 400 Bad Request
//! content-type: text/plain; charset=utf-8
//!
//! Passport number: The first character must be a letter.
//! ```

pub mod aggregator;
pub mod extractors;
pub mod rules;
pub mod sanitizers;
pub mod validators;

// Re-export commonly used items
pub use aggregator::{run_rule_set, RuleContext};
pub use extractors::{
    Aadhaar, DocumentRoute, FieldError, Other, Pan, Passport, Vaccine, ValidatedDocument,
    ValidationBuilder, ValidationError,
};
pub use rules::{Check, Choice, DateRef, FieldSpec, RuleBook, RuleSet, Step};
pub use sanitizers::{collapse_whitespace, group_digits, strip_whitespace, trim, uppercase, Sanitizer};
