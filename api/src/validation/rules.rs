//! Declarative rule sets, one per document type
//!
//! A rule set is an ordered list of field specs. Each spec lists the steps
//! run against one payload field: sanitizers rewrite the value, checks stop
//! the chain with a `"<label>: <reason>"` message on the first failure.

use chrono::NaiveDate;
use shared::{DocumentKind, ReferenceCategory, ValidationSettings, VaccineType};

use super::sanitizers::Sanitizer;
use super::validators::describe_date;

/// Reason reported when a required value is missing
pub const REQUIRED_REASON: &str = "Required";
/// Reason reported when the reference service could not answer
pub const LOOKUP_UNAVAILABLE_REASON: &str = "Invalid value";
/// Reason reported when the reference service has no match
pub const NOT_IN_DROP_DOWN_REASON: &str = "Choose one from drop-down";

/// Date a `DateBefore`/`DateAfter` check compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRef {
    /// Current processing date
    Today,
    Fixed(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Required,
    Digits,
    Alpha { ignore: &'static str },
    Alphanumeric,
    Length { min: usize, max: usize },
    StartsWithLetter,
    Date,
    DateBefore(DateRef),
    DateAfter(DateRef),
    OneOf(Choice),
    /// Value must exist in the reference-data service
    Exists(ReferenceCategory),
}

/// Closed drop-down sets, each parsed into its shared enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Vaccine,
    Meal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Sanitize(Sanitizer),
    Check { check: Check, reason: String },
}

/// Whether a field's chain runs at all for a given payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Always,
    /// Skip the chain and null the field when `sibling` equals `equals`
    Unless {
        sibling: &'static str,
        equals: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub label: &'static str,
    pub applicability: Applicability,
    pub steps: Vec<Step>,
}

impl FieldSpec {
    pub fn new(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            applicability: Applicability::Always,
            steps: Vec::new(),
        }
    }

    pub fn unless(mut self, sibling: &'static str, equals: &'static str) -> Self {
        self.applicability = Applicability::Unless { sibling, equals };
        self
    }

    pub fn sanitize(mut self, sanitizer: Sanitizer) -> Self {
        self.steps.push(Step::Sanitize(sanitizer));
        self
    }

    pub fn check(mut self, check: Check, reason: impl Into<String>) -> Self {
        self.steps.push(Step::Check {
            check,
            reason: reason.into(),
        });
        self
    }

    pub fn required(self) -> Self {
        self.check(Check::Required, REQUIRED_REASON)
    }

    pub fn trim(self) -> Self {
        self.sanitize(Sanitizer::Trim)
    }

    pub fn strip_whitespace(self) -> Self {
        self.sanitize(Sanitizer::StripWhitespace)
    }

    pub fn collapse_whitespace(self) -> Self {
        self.sanitize(Sanitizer::CollapseWhitespace)
    }

    pub fn uppercase(self) -> Self {
        self.sanitize(Sanitizer::Uppercase)
    }

    /// Remote existence check; its reasons are fixed by the lookup outcome
    pub fn exists_in(self, category: ReferenceCategory) -> Self {
        self.check(Check::Exists(category), NOT_IN_DROP_DOWN_REASON)
    }

    /// Full client-visible message for a failure reason
    pub fn message(&self, reason: &str) -> String {
        format!("{}: {}", self.label, reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub kind: DocumentKind,
    pub fields: Vec<FieldSpec>,
}

impl RuleSet {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == name)
    }
}

/// Name/surname/nationality style field: letters only, upper-cased
fn letters_field(field: &'static str, label: &'static str, strip: bool) -> FieldSpec {
    let spec = FieldSpec::new(field, label).required().trim();
    let spec = if strip { spec.strip_whitespace() } else { spec };
    spec.check(Check::Alpha { ignore: "" }, "Letters only").uppercase()
}

fn place_field(field: &'static str, label: &'static str, ignore: &'static str) -> FieldSpec {
    FieldSpec::new(field, label)
        .required()
        .trim()
        .collapse_whitespace()
        .check(Check::Alpha { ignore }, "Letters only")
        .uppercase()
}

fn past_date_field(field: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(field, label)
        .required()
        .trim()
        .strip_whitespace()
        .check(Check::Date, "Invalid date")
        .check(Check::DateBefore(DateRef::Today), "Must be before today")
}

pub fn passport_rules(settings: &ValidationSettings) -> RuleSet {
    let cutoff = settings.passport_expiry_cutoff;

    RuleSet {
        kind: DocumentKind::Passport,
        fields: vec![
            letters_field("given_name", "Given Name", false),
            letters_field("surname", "Surname", false),
            FieldSpec::new("passport_number", "Passport number")
                .required()
                .trim()
                .strip_whitespace()
                .check(Check::Length { min: 8, max: 8 }, "Must be 8 characters long")
                .check(Check::Alphanumeric, "Letters and numbers only")
                .check(Check::StartsWithLetter, "The first character must be a letter.")
                .uppercase(),
            past_date_field("date_of_birth", "Date of birth"),
            letters_field("nationality", "Nationality", true),
            FieldSpec::new("country_code", "Country code")
                .required()
                .trim()
                .strip_whitespace()
                .check(Check::Alpha { ignore: "" }, "Letters only")
                .check(Check::Length { min: 3, max: 3 }, "Must be 3 characters long")
                .uppercase(),
            place_field("place_of_birth", "Place of birth", " ,"),
            place_field("place_of_issue", "Place of issue", " "),
            past_date_field("date_of_issue", "Date of issue"),
            FieldSpec::new("date_of_expiry", "Date of expiry")
                .required()
                .trim()
                .strip_whitespace()
                .check(Check::Date, "Invalid date")
                .check(
                    Check::DateAfter(DateRef::Fixed(cutoff)),
                    format!("Must be after {}", describe_date(cutoff)),
                ),
        ],
    }
}

pub fn aadhaar_rules() -> RuleSet {
    RuleSet {
        kind: DocumentKind::Aadhaar,
        fields: vec![FieldSpec::new("aadhaar_number", "Aadhaar number")
            .required()
            .trim()
            .strip_whitespace()
            .check(Check::Digits, "Must be number")
            .check(Check::Length { min: 12, max: 12 }, "Must be 12 digits long")
            .sanitize(Sanitizer::GroupDigits(4))],
    }
}

pub fn pan_rules() -> RuleSet {
    RuleSet {
        kind: DocumentKind::Pan,
        fields: vec![FieldSpec::new("pan_number", "PAN number")
            .required()
            .trim()
            .strip_whitespace()
            .check(Check::Alphanumeric, "Letters and numbers only")
            .check(Check::Length { min: 10, max: 10 }, "Must be 10 characters long")
            .uppercase()],
    }
}

pub fn vaccine_rules() -> RuleSet {
    let none = VaccineType::None.as_str();

    RuleSet {
        kind: DocumentKind::Vaccine,
        fields: vec![
            FieldSpec::new("vaccine_type", "Vaccine type")
                .uppercase()
                .required()
                .check(Check::OneOf(Choice::Vaccine), NOT_IN_DROP_DOWN_REASON),
            past_date_field("last_vaccination_date", "Date of vaccine").unless("vaccine_type", none),
            FieldSpec::new("vaccination_certificate_no", "Vaccination certificate number")
                .unless("vaccine_type", none)
                .required()
                .trim()
                .strip_whitespace()
                .check(Check::Digits, "Numbers only")
                .check(Check::Length { min: 11, max: 11 }, "Must be 11 digits long"),
        ],
    }
}

pub fn other_rules() -> RuleSet {
    RuleSet {
        kind: DocumentKind::Other,
        fields: vec![
            FieldSpec::new("division_name", "Division name")
                .required()
                .exists_in(ReferenceCategory::Division),
            FieldSpec::new("meal_preferences", "Meal preferences")
                .uppercase()
                .required()
                .check(Check::OneOf(Choice::Meal), NOT_IN_DROP_DOWN_REASON),
            FieldSpec::new("place_of_work", "Place of work")
                .trim()
                .required()
                .collapse_whitespace()
                .check(Check::Alpha { ignore: " " }, "Letters only")
                .uppercase(),
            FieldSpec::new("state_name", "State name")
                .required()
                .exists_in(ReferenceCategory::State),
        ],
    }
}

/// Every rule set, built once from the startup settings
#[derive(Debug, Clone)]
pub struct RuleBook {
    passport: RuleSet,
    aadhaar: RuleSet,
    pan: RuleSet,
    vaccine: RuleSet,
    other: RuleSet,
}

impl RuleBook {
    pub fn new(settings: &ValidationSettings) -> Self {
        Self {
            passport: passport_rules(settings),
            aadhaar: aadhaar_rules(),
            pan: pan_rules(),
            vaccine: vaccine_rules(),
            other: other_rules(),
        }
    }

    pub fn get(&self, kind: DocumentKind) -> &RuleSet {
        match kind {
            DocumentKind::Passport => &self.passport,
            DocumentKind::Aadhaar => &self.aadhaar,
            DocumentKind::Pan => &self.pan,
            DocumentKind::Vaccine => &self.vaccine,
            DocumentKind::Other => &self.other,
        }
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new(&ValidationSettings::default())
    }
}
