use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned study identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(pub String);

impl StudyId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<StudyId>,
    #[serde(default)]
    pub studyname: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub createdby: String,
}

impl Study {
    /// A blank, unsaved study carrying the form's fields.
    pub fn from_form(form: StudyForm) -> Self {
        Self {
            studyname: form.studyname,
            description: form.description,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Overwrites the user-editable fields, leaving id, levels and author alone.
    pub fn apply_form(&mut self, form: StudyForm) {
        self.studyname = form.studyname;
        self.description = form.description;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub levelorder: i64,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub levelname: String,
    #[serde(default)]
    pub createdby: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub valueorder: i64,
    #[serde(default)]
    pub valuename: String,
    #[serde(default)]
    pub createdby: String,
}

// The backend emits `"id": ""` for documents that were never assigned one.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<StudyId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.is_empty()).map(StudyId))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyField {
    StudyName,
    Description,
}

impl StudyField {
    pub fn key(self) -> &'static str {
        match self {
            Self::StudyName => "studyname",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for StudyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} must not be empty")]
    EmptyField(StudyField),
}

/// User input for creating or editing a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyForm {
    pub studyname: String,
    pub description: String,
}

impl StudyForm {
    pub fn new(studyname: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            studyname: studyname.into(),
            description: description.into(),
        }
    }

    pub fn prefilled(study: &Study) -> Self {
        Self::new(study.studyname.clone(), study.description.clone())
    }

    pub fn validate(self) -> Result<Self, FormError> {
        if self.studyname.trim().is_empty() {
            return Err(FormError::EmptyField(StudyField::StudyName));
        }
        if self.description.trim().is_empty() {
            return Err(FormError::EmptyField(StudyField::Description));
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
