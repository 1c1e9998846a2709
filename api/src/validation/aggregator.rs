//! Runs a rule set against a payload and collects the failures
//!
//! Every field is evaluated, in declared order, even after an earlier field
//! has failed. Each field contributes at most one error: its chain stops at
//! the first failing check. Values are normalized in place as the chain runs.

use chrono::NaiveDate;
use shared::DocumentPayload;
use tracing::warn;

use super::extractors::{FieldError, ValidationBuilder};
use super::rules::{
    Applicability, Check, Choice, DateRef, FieldSpec, RuleSet, Step, LOOKUP_UNAVAILABLE_REASON,
};
use super::validators::{
    has_length, is_after, is_alpha, is_alphanumeric, is_before, is_date, is_digits, is_meal_type,
    is_present, is_vaccine_type, starts_with_letter,
};
use crate::reference::ReferenceLookup;

/// Per-request inputs that checks need besides the value itself
pub struct RuleContext<'a> {
    /// Current processing date, resolved once per request
    pub today: NaiveDate,
    pub lookup: &'a dyn ReferenceLookup,
}

impl<'a> RuleContext<'a> {
    pub fn new(today: NaiveDate, lookup: &'a dyn ReferenceLookup) -> Self {
        Self { today, lookup }
    }

    fn resolve(&self, date: DateRef) -> NaiveDate {
        match date {
            DateRef::Today => self.today,
            DateRef::Fixed(date) => date,
        }
    }
}

/// Validate and normalize `payload` against `rule_set`.
///
/// Returns every failing field in declared order; callers report the first.
pub async fn run_rule_set(
    rule_set: &RuleSet,
    payload: &mut DocumentPayload,
    ctx: &RuleContext<'_>,
) -> Result<(), Vec<FieldError>> {
    let mut builder = ValidationBuilder::new();

    for spec in &rule_set.fields {
        if let Err(message) = run_field(spec, payload, ctx).await {
            builder.add_error(spec.field, message);
        }
    }

    builder.build()
}

fn applies(spec: &FieldSpec, payload: &DocumentPayload) -> bool {
    match &spec.applicability {
        Applicability::Always => true,
        Applicability::Unless { sibling, equals } => {
            payload.text(sibling).as_deref() != Some(*equals)
        }
    }
}

async fn run_field(
    spec: &FieldSpec,
    payload: &mut DocumentPayload,
    ctx: &RuleContext<'_>,
) -> Result<(), String> {
    if !applies(spec, payload) {
        payload.set_null(spec.field);
        return Ok(());
    }

    let mut value = payload.text(spec.field);
    let outcome = run_steps(spec, &mut value, ctx).await;

    // Absent and null fields stay as submitted.
    if let Some(normalized) = value {
        payload.set_text(spec.field, normalized);
    }

    outcome
}

async fn run_steps(
    spec: &FieldSpec,
    value: &mut Option<String>,
    ctx: &RuleContext<'_>,
) -> Result<(), String> {
    for step in &spec.steps {
        match step {
            Step::Sanitize(sanitizer) => {
                if let Some(current) = value.as_mut() {
                    let next = sanitizer.apply(current);
                    *current = next;
                }
            }
            Step::Check {
                check: Check::Exists(category),
                reason,
            } => {
                let Some(current) = value.as_deref() else {
                    return Err(spec.message(reason));
                };
                match ctx.lookup.exists(*category, current).await {
                    Ok(true) => {}
                    Ok(false) => return Err(spec.message(reason)),
                    Err(err) => {
                        warn!(
                            field = spec.field,
                            category = %category,
                            error = %err,
                            "reference lookup failed; rejecting value"
                        );
                        return Err(spec.message(LOOKUP_UNAVAILABLE_REASON));
                    }
                }
            }
            Step::Check { check, reason } => {
                if !passes(check, value.as_deref(), ctx) {
                    return Err(spec.message(reason));
                }
            }
        }
    }

    Ok(())
}

fn passes(check: &Check, value: Option<&str>, ctx: &RuleContext<'_>) -> bool {
    if let Check::Required = check {
        return is_present(value);
    }

    let Some(value) = value else {
        return false;
    };

    match check {
        Check::Required => true,
        Check::Digits => is_digits(value),
        Check::Alpha { ignore } => is_alpha(value, ignore),
        Check::Alphanumeric => is_alphanumeric(value),
        Check::Length { min, max } => has_length(value, *min, *max),
        Check::StartsWithLetter => starts_with_letter(value),
        Check::Date => is_date(value),
        Check::DateBefore(reference) => is_before(value, ctx.resolve(*reference)),
        Check::DateAfter(reference) => is_after(value, ctx.resolve(*reference)),
        Check::OneOf(Choice::Vaccine) => is_vaccine_type(value),
        Check::OneOf(Choice::Meal) => is_meal_type(value),
        // Handled asynchronously in `run_steps`.
        Check::Exists(_) => false,
    }
}
