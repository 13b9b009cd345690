use serde::Deserialize;

use crate::models::RatingEdit;

pub const MAX_REVIEW_LEN: usize = 255;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditForm {
    pub rating: String,
    pub review: String,
    pub csrf_token: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub title: String,
    pub csrf_token: String,
}

/// Messages keyed by field, plus form-level messages that belong to no field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormErrors {
    fields: Vec<(&'static str, String)>,
    form: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    pub fn field(&self, name: &str) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(move |(f, _)| *f == name).map(|(_, m)| m.as_str())
    }

    pub fn form(&self) -> &[String] {
        &self.form
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl EditForm {
    pub fn validate(&self) -> Result<RatingEdit, FormErrors> {
        let mut errors = FormErrors::default();

        let rating = self.rating.trim();
        let mut parsed = None;
        if rating.is_empty() {
            errors.add("rating", "This field is required.");
        } else {
            match rating.parse::<f64>() {
                Ok(value) if value.is_finite() && (0.0..=10.0).contains(&value) => {
                    parsed = Some(value)
                },
                Ok(_) => errors.add("rating", "Rating must be between 0 and 10."),
                Err(_) => errors.add("rating", "Rating must be a number, e.g. 7.4."),
            }
        }

        let review = self.review.trim();
        if review.is_empty() {
            errors.add("review", "This field is required.");
        } else if review.chars().count() > MAX_REVIEW_LEN {
            errors.add("review", format!("Review must be at most {MAX_REVIEW_LEN} characters."));
        }

        errors.into_result(|| RatingEdit {
            rating: parsed.unwrap_or_default(),
            review: review.to_string(),
        })
    }
}

impl SearchForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        }
        errors.into_result(|| title.to_string())
    }
}
