//! Study view-model: the last-fetched collection, the current selection, and
//! the five user operations mapped onto [`StudyResource`] calls.
//!
//! Mutations are awaited before the collection is refreshed, and the
//! selection follows the server id across refreshes rather than its index.

use shared::domain::{Study, StudyForm, StudyId};
use tracing::{info, warn};

use crate::{
    error::ControllerError,
    prompt::Prompter,
    resource::StudyResource,
};

pub const ADD_NAME_PROMPT: &str = "Enter the study name";
pub const ADD_DESCRIPTION_PROMPT: &str = "Enter the study description";
pub const UPDATE_NAME_PROMPT: &str = "Enter a new study name";
pub const UPDATE_DESCRIPTION_PROMPT: &str = "Enter a new description";

/// The focused study paired with its position in the last-fetched list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub study: Study,
    pub idx: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Cancelled,
}

pub struct StudyController<R, P> {
    resource: R,
    prompter: P,
    studies: Vec<Study>,
    selected: Option<Selection>,
}

impl<R: StudyResource, P: Prompter> StudyController<R, P> {
    pub fn new(resource: R, prompter: P) -> Self {
        Self {
            resource,
            prompter,
            studies: Vec::new(),
            selected: None,
        }
    }

    pub fn studies(&self) -> &[Study] {
        &self.studies
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Refreshes the collection; with `index`, selects the study at that position.
    ///
    /// A failed fetch is alerted through the prompter and leaves the previous
    /// collection and selection in place.
    pub async fn list(&mut self, index: Option<usize>) -> Result<(), ControllerError> {
        self.fetch().await?;
        self.resolve_selection();
        match index {
            Some(index) => self.select_index(index),
            None => Ok(()),
        }
    }

    pub async fn get(&mut self, index: usize) -> Result<(), ControllerError> {
        let id = self.id_at(index)?;
        let study = self.resource.get(&id).await?;
        self.selected = Some(Selection { study, idx: index });
        Ok(())
    }

    pub async fn add(&mut self) -> Result<Outcome, ControllerError> {
        let Some(studyname) = self.prompter.prompt(ADD_NAME_PROMPT, None)? else {
            return Ok(Outcome::Cancelled);
        };
        let Some(description) = self.prompter.prompt(ADD_DESCRIPTION_PROMPT, None)? else {
            return Ok(Outcome::Cancelled);
        };
        let form = StudyForm::new(studyname, description).validate()?;

        let created = self.resource.save(&Study::from_form(form)).await?;
        info!(
            id = created.id.as_ref().map(StudyId::as_str),
            studyname = %created.studyname,
            "created study"
        );

        self.list(None).await?;
        Ok(Outcome::Applied)
    }

    pub async fn update(&mut self, index: usize) -> Result<Outcome, ControllerError> {
        let id = self.id_at(index)?;
        let current = StudyForm::prefilled(&self.studies[index]);

        let Some(studyname) = self
            .prompter
            .prompt(UPDATE_NAME_PROMPT, Some(current.studyname.as_str()))?
        else {
            return Ok(Outcome::Cancelled);
        };
        let Some(description) = self
            .prompter
            .prompt(UPDATE_DESCRIPTION_PROMPT, Some(current.description.as_str()))?
        else {
            return Ok(Outcome::Cancelled);
        };
        let form = StudyForm::new(studyname, description).validate()?;

        // Local copy only changes once the server accepted the edit.
        let mut edited = self.studies[index].clone();
        edited.apply_form(form);
        self.resource.save(&edited).await?;
        self.studies[index] = edited;
        info!(id = %id, "updated study");

        self.fetch().await?;
        let idx = self
            .position_of(&id)
            .or_else(|| (index < self.studies.len()).then_some(index));
        match idx {
            Some(idx) => self.select_index(idx)?,
            None => self.selected = None,
        }
        Ok(Outcome::Applied)
    }

    pub async fn remove(&mut self, index: usize) -> Result<(), ControllerError> {
        let id = self.id_at(index)?;
        self.resource.delete(&id).await?;
        info!(id = %id, "removed study");

        self.selected = None;
        self.list(None).await
    }

    async fn fetch(&mut self) -> Result<(), ControllerError> {
        match self.resource.query().await {
            Ok(studies) => {
                self.studies = studies;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to list studies");
                self.prompter.alert(&err.payload())?;
                Err(err.into())
            }
        }
    }

    fn select_index(&mut self, index: usize) -> Result<(), ControllerError> {
        let study = self
            .studies
            .get(index)
            .cloned()
            .ok_or(ControllerError::IndexOutOfBounds {
                index,
                len: self.studies.len(),
            })?;
        self.selected = Some(Selection { study, idx: index });
        Ok(())
    }

    // Re-point the selection at the refreshed copy of the same study.
    fn resolve_selection(&mut self) {
        let Some(id) = self
            .selected
            .as_ref()
            .and_then(|selection| selection.study.id.clone())
        else {
            self.selected = None;
            return;
        };
        self.selected = self.position_of(&id).map(|idx| Selection {
            study: self.studies[idx].clone(),
            idx,
        });
    }

    fn position_of(&self, id: &StudyId) -> Option<usize> {
        self.studies
            .iter()
            .position(|study| study.id.as_ref() == Some(id))
    }

    fn id_at(&self, index: usize) -> Result<StudyId, ControllerError> {
        let study = self
            .studies
            .get(index)
            .ok_or(ControllerError::IndexOutOfBounds {
                index,
                len: self.studies.len(),
            })?;
        study.id.clone().ok_or(ControllerError::MissingId { index })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
