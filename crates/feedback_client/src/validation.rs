//! Required-field validation shared by every form.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Whitespace-only values count as missing.
    pub trims: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            trims: true,
        }
    }

    /// Only an empty value is missing.
    pub const fn untrimmed(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            trims: false,
        }
    }

    pub fn is_missing(&self, value: &str) -> bool {
        if self.trims {
            value.trim().is_empty()
        } else {
            value.is_empty()
        }
    }

    pub fn required_message(&self) -> String {
        format!("{} is required", self.label)
    }
}

pub mod fields {
    use super::FieldSpec;

    pub const EMAIL: FieldSpec = FieldSpec::new("email", "Email");
    pub const PASSWORD: FieldSpec = FieldSpec::new("password", "Password");
    pub const FIRST_NAME: FieldSpec = FieldSpec::new("firstName", "First Name");
    pub const LAST_NAME: FieldSpec = FieldSpec::new("lastName", "Last Name");
    pub const TITLE: FieldSpec = FieldSpec::new("title", "Title");
    pub const DESCRIPTION: FieldSpec = FieldSpec::new("description", "Description");
    pub const CATEGORY: FieldSpec = FieldSpec::new("category", "Category");
    pub const USERNAME: FieldSpec = FieldSpec::new("username", "Username");
    pub const DATE: FieldSpec = FieldSpec::untrimmed("date", "Date");
    pub const COMMENT: FieldSpec = FieldSpec::new("comment", "Comment");

    pub const SIGN_IN: &[FieldSpec] = &[EMAIL, PASSWORD];
    pub const SIGN_UP: &[FieldSpec] = &[FIRST_NAME, LAST_NAME, EMAIL, PASSWORD];
    pub const FEEDBACK: &[FieldSpec] = &[TITLE, DESCRIPTION, CATEGORY];
}

/// Field name to human-readable message. No entry means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorMap {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrorMap {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn clear_field(&mut self, field: &str) -> bool {
        self.errors.remove(field).is_some()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Checks every required field and reports each blank one.
pub fn validate<'a>(
    fields: impl IntoIterator<Item = (&'a FieldSpec, &'a str)>,
) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::default();
    for (spec, value) in fields {
        if spec.is_missing(value) {
            errors.insert(spec.name, spec.required_message());
        }
    }
    errors
}

/// Like [`validate`] but stops at the first blank field.
pub fn validate_first<'a>(
    fields: impl IntoIterator<Item = (&'a FieldSpec, &'a str)>,
) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::default();
    if let Some((spec, _)) = fields.into_iter().find(|(spec, value)| spec.is_missing(value)) {
        errors.insert(spec.name, spec.required_message());
    }
    errors
}

/// Values and inline errors of one form. Editing a field drops that field's
/// error without re-validating; the next submit recomputes everything.
#[derive(Debug, Clone)]
pub struct FormState {
    specs: &'static [FieldSpec],
    values: BTreeMap<&'static str, String>,
    errors: ValidationErrorMap,
}

impl FormState {
    pub fn new(specs: &'static [FieldSpec]) -> Self {
        Self {
            specs,
            values: specs.iter().map(|spec| (spec.name, String::new())).collect(),
            errors: ValidationErrorMap::default(),
        }
    }

    /// Returns `false` when the form has no such field.
    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> bool {
        let Some(slot) = self.values.get_mut(field) else {
            return false;
        };
        *slot = value.into();
        self.errors.clear_field(field);
        true
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn errors(&self) -> &ValidationErrorMap {
        &self.errors
    }

    pub fn set_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    pub fn validate(&mut self) -> bool {
        let errors = validate(self.specs.iter().map(|spec| (spec, self.value(spec.name))));
        self.errors = errors;
        self.errors.is_valid()
    }

    pub fn reset(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.errors.clear();
    }
}
