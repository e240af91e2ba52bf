//! Declarative form validation
//!
//! A [`FormSchema`] lists fields with an ordered list of [`Rule`]s. [`validate`]
//! runs every field's rules in order and collects field-level errors. A failing
//! [`Rule::Required`] stops the remaining rules for that field.

mod schemas;

pub use schemas::{ARTICLE_FORM, REGISTER_FORM};

use crate::http::FormData;

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Character count within `min..=max` (no upper bound when `max` is `None`)
    Length { min: usize, max: Option<usize> },
    /// Present and not blank
    Required,
    /// Equal to another field of the same form
    EqualTo {
        other: &'static str,
        message: &'static str,
    },
}

/// How a field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    TextArea,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: &'static [Rule],
}

#[derive(Debug)]
pub struct FormSchema {
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of validating one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages for one field, in rule order
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Record an error found outside the schema (e.g. a store constraint)
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

/// Evaluate `schema` against a submission
pub fn validate(schema: &FormSchema, form: &FormData) -> ValidationReport {
    let mut report = ValidationReport::default();
    for field in schema.fields {
        let value = form.value(field.name);
        for rule in field.rules {
            match check(rule, value, form) {
                Ok(()) => {}
                Err(message) => {
                    let stop = matches!(rule, Rule::Required);
                    report.push(field.name, message);
                    if stop {
                        break;
                    }
                }
            }
        }
    }
    report
}

fn check(rule: &Rule, value: &str, form: &FormData) -> Result<(), String> {
    match *rule {
        Rule::Length { min, max } => {
            let len = value.chars().count();
            let too_long = max.is_some_and(|max| len > max);
            if len < min || too_long {
                Err(length_message(min, max))
            } else {
                Ok(())
            }
        }
        Rule::Required => {
            if value.trim().is_empty() {
                Err("This field is required.".to_string())
            } else {
                Ok(())
            }
        }
        Rule::EqualTo { other, message } => {
            if value == form.value(other) {
                Ok(())
            } else {
                Err(message.to_string())
            }
        }
    }
}

fn length_message(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) => format!("Field must be between {min} and {max} characters long."),
        None if min == 1 => "Field must be at least 1 character long.".to_string(),
        None => format!("Field must be at least {min} characters long."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str, confirm: &str) -> FormData {
        FormData::from_pairs([
            ("name", "Alice"),
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("password", password),
            ("confirm", confirm),
        ])
    }

    #[test]
    fn test_valid_registration() {
        let report = validate(&REGISTER_FORM, &registration("pw1", "pw1"));
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn test_password_mismatch() {
        let report = validate(&REGISTER_FORM, &registration("pw1", "pw2"));
        assert!(!report.is_valid());
        let messages: Vec<_> = report.errors_for("password").collect();
        assert_eq!(messages, vec!["Passwords do not match"]);
        assert_eq!(report.errors_for("confirm").count(), 0);
    }

    #[test]
    fn test_required_stops_chain() {
        // empty password equals empty confirm, but Required fails first and stops
        let report = validate(&REGISTER_FORM, &registration("", ""));
        let messages: Vec<_> = report.errors_for("password").collect();
        assert_eq!(messages, vec!["This field is required."]);

        let report = validate(&REGISTER_FORM, &registration("   ", "x"));
        assert_eq!(report.errors_for("password").count(), 1);
    }

    #[test]
    fn test_length_bounds() {
        let form = FormData::from_pairs([
            ("name", ""),
            ("username", "abc"),
            ("email", "a@b.c"),
            ("password", "pw"),
            ("confirm", "pw"),
        ]);
        let report = validate(&REGISTER_FORM, &form);
        assert_eq!(
            report.errors_for("name").collect::<Vec<_>>(),
            vec!["Field must be between 1 and 50 characters long."]
        );
        assert_eq!(
            report.errors_for("username").collect::<Vec<_>>(),
            vec!["Field must be between 4 and 25 characters long."]
        );
        assert_eq!(report.errors_for("email").count(), 1);
        assert_eq!(report.errors().len(), 3);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 25 multi-byte characters is still a valid username
        let username = "\u{e9}".repeat(25);
        let form = FormData::from_pairs([
            ("name", "Alice"),
            ("username", username.as_str()),
            ("email", "alice@example.com"),
            ("password", "pw"),
            ("confirm", "pw"),
        ]);
        assert!(validate(&REGISTER_FORM, &form).is_valid());
    }

    #[test]
    fn test_article_body_minimum() {
        let short = FormData::from_pairs([("title", "Hello"), ("body", "too short")]);
        let report = validate(&ARTICLE_FORM, &short);
        assert_eq!(
            report.errors_for("body").collect::<Vec<_>>(),
            vec!["Field must be at least 30 characters long."]
        );

        let body = "B".repeat(30);
        let long = FormData::from_pairs([("title", "Hello"), ("body", body.as_str())]);
        assert!(validate(&ARTICLE_FORM, &long).is_valid());

        let body = "B".repeat(40);
        let no_title = FormData::from_pairs([("body", body.as_str())]);
        assert_eq!(validate(&ARTICLE_FORM, &no_title).errors_for("title").count(), 1);

        let title = "T".repeat(201);
        let long_title = FormData::from_pairs([("title", title.as_str()), ("body", body.as_str())]);
        assert!(!validate(&ARTICLE_FORM, &long_title).is_valid());
    }

    #[test]
    fn test_length_message_singular() {
        assert_eq!(
            length_message(1, None),
            "Field must be at least 1 character long."
        );
    }
}
