//! Field-level input validation.
//!
//! Validators return a [`ValidationErrors`] map keyed by the failing field so
//! clients can look up errors per field instead of parsing free text.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::Title;
use crate::ports::PageRequest;

/// Default page size when only `page` is supplied.
pub const DEFAULT_PER_PAGE: u64 = 15;

/// Largest accepted `per_page`.
pub const MAX_PER_PAGE: u64 = 100;

/// A single failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field missing, null, or blank after trimming.
    Required,
    /// Field present but not a string.
    String,
    /// String longer than the given number of characters.
    MaxChars(usize),
    /// Number below the given minimum.
    Min(u64),
    /// Number above the given maximum.
    Max(u64),
}

impl Rule {
    /// Stable machine-readable rule name.
    pub fn code(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::MaxChars(_) | Rule::Max(_) => "max",
            Rule::Min(_) => "min",
        }
    }

    /// Human-readable message for `field`.
    pub fn message(&self, field: &str) -> String {
        match self {
            Rule::Required => format!("The {field} field is required."),
            Rule::String => format!("The {field} must be a string."),
            Rule::MaxChars(max) => {
                format!("The {field} may not be greater than {max} characters.")
            }
            Rule::Min(min) => format!("The {field} must be at least {min}."),
            Rule::Max(max) => format!("The {field} may not be greater than {max}."),
        }
    }
}

/// Failed rules grouped by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<Rule>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: &'static str, rule: Rule) -> Self {
        let mut errors = Self::new();
        errors.add(field, rule);
        errors
    }

    pub fn add(&mut self, field: &'static str, rule: Rule) {
        self.fields.entry(field).or_default().push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    #[cfg(test)]
    pub(crate) fn rules(&self, field: &str) -> &[Rule] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Field name to rendered messages, the shape sent to clients.
    pub fn messages(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(field, rules)| {
                let messages = rules.iter().map(|rule| rule.message(field)).collect();
                (field.to_string(), messages)
            })
            .collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, rules) in &self.fields {
            for rule in rules {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{field}: {}", rule.code())?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate the raw `title` member of a request body.
pub fn validate_title(raw: Option<&Value>) -> Result<Title, ValidationErrors> {
    let rule = match raw {
        None | Some(Value::Null) => Rule::Required,
        Some(Value::String(s)) => match Title::parse(s) {
            Ok(title) => return Ok(title),
            Err(rule) => rule,
        },
        Some(_) => Rule::String,
    };
    Err(ValidationErrors::single("title", rule))
}

/// Validate optional pagination parameters.
///
/// Returns `None` when neither parameter is present, meaning "return everything".
pub fn validate_page(
    page: Option<i64>,
    per_page: Option<i64>,
) -> Result<Option<PageRequest>, ValidationErrors> {
    if page.is_none() && per_page.is_none() {
        return Ok(None);
    }

    let page = page.unwrap_or(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE as i64);

    let mut errors = ValidationErrors::new();
    if page < 1 {
        errors.add("page", Rule::Min(1));
    }
    if per_page < 1 {
        errors.add("per_page", Rule::Min(1));
    } else if per_page > MAX_PER_PAGE as i64 {
        errors.add("per_page", Rule::Max(MAX_PER_PAGE));
    }

    errors.into_result(Some(PageRequest {
        page: page.unsigned_abs(),
        per_page: per_page.unsigned_abs(),
    }))
}
