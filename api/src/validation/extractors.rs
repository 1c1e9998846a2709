//! Custom Axum extractor for validated document submissions
//!
//! `ValidatedDocument<D>` checks the application id, parses the JSON body,
//! runs the rule set registered for `D`, and hands the handler the
//! normalized payload. Any failure becomes a plain-text 400 carrying the
//! first error message.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde_json::Value;
use shared::{ApplicationId, DocumentKind, DocumentPayload};
use std::marker::PhantomData;

use super::aggregator::{run_rule_set, RuleContext};
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Message reported for a non-numeric application id
pub const INVALID_APPLICATION_ID: &str = "Application ID: Must be a number";

/// Prefix the legacy passport/aadhaar/PAN form puts on every field name
pub const LEGACY_FIELD_PREFIX: &str = "modified_";

/// A field-level validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation error that converts to an HTTP response
#[derive(Debug)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// The error shown to the client
    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = err
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());
        ApiError::bad_request("ValidationError", message)
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Marker for a document route; selects the rule set from the rule book
pub trait DocumentRoute: Send + Sync + 'static {
    const KIND: DocumentKind;
}

macro_rules! document_route {
    ($name:ident, $kind:expr) => {
        #[derive(Debug)]
        pub struct $name;

        impl DocumentRoute for $name {
            const KIND: DocumentKind = $kind;
        }
    };
}

document_route!(Passport, DocumentKind::Passport);
document_route!(Aadhaar, DocumentKind::Aadhaar);
document_route!(Pan, DocumentKind::Pan);
document_route!(Vaccine, DocumentKind::Vaccine);
document_route!(Other, DocumentKind::Other);

/// Extractor yielding a sanitized and validated document payload
pub struct ValidatedDocument<D> {
    pub application_id: ApplicationId,
    pub payload: DocumentPayload,
    document: PhantomData<fn() -> D>,
}

impl<D: DocumentRoute> ValidatedDocument<D> {
    pub fn kind(&self) -> DocumentKind {
        D::KIND
    }
}

fn parse_body(bytes: &[u8]) -> Result<DocumentPayload, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(DocumentPayload::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(DocumentPayload::from(map)),
        Ok(_) => Err(ValidationError::single(
            "body",
            "Request body must be a JSON object",
        )),
        Err(err) => Err(ValidationError::single(
            "body",
            format!("Invalid JSON payload: {}", err),
        )),
    }
}

#[async_trait]
impl<D> FromRequest<AppState> for ValidatedDocument<D>
where
    D: DocumentRoute,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        // Step 1: Application id, always reported ahead of field errors
        let application_id = Path::<String>::from_request_parts(&mut parts, state)
            .await
            .ok()
            .and_then(|Path(raw)| raw.parse::<ApplicationId>().ok());

        // Step 2: Parse JSON
        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|_| ValidationError::single("body", "Failed to read request body"))?;
        let mut payload = parse_body(&bytes)?;
        payload.adopt_prefixed_keys(LEGACY_FIELD_PREFIX);

        // Step 3: Sanitize and validate every field
        let rule_set = state.rules.get(D::KIND);
        let ctx = RuleContext::new(Local::now().date_naive(), state.lookup.as_ref());
        let outcome = run_rule_set(rule_set, &mut payload, &ctx).await;

        let mut builder = ValidationBuilder::new();
        if application_id.is_none() {
            builder.add_error("application_id", INVALID_APPLICATION_ID);
        }
        if let Err(field_errors) = outcome {
            builder.extend(field_errors);
        }

        match (application_id, builder.build()) {
            (Some(application_id), Ok(())) => {
                metrics::observe_document(D::KIND.as_str(), true);
                Ok(ValidatedDocument {
                    application_id,
                    payload,
                    document: PhantomData,
                })
            }
            (_, result) => {
                let errors = result.err().unwrap_or_default();
                metrics::observe_document(D::KIND.as_str(), false);
                tracing::info!(
                    document = %D::KIND,
                    error_count = errors.len(),
                    errors = ?errors,
                    "document rejected"
                );
                Err(ValidationError::new(errors))
            }
        }
    }
}

/// Builder for accumulating validation errors
#[derive(Debug, Default)]
pub struct ValidationBuilder {
    errors: Vec<FieldError>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Append errors from a rule-set run, keeping their order
    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldError>) -> &mut Self {
        self.errors.extend(errors);
        self
    }

    /// `Err` with every collected error, in the order they were added
    pub fn build(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
