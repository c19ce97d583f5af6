use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::branch::normalize_branch_name;

const BRANCH_NAME_MAX_LEN: u64 = 30;

#[derive(Debug, Error)]
pub enum BranchFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("branch name `{0}` must be alphanumeric")]
    InvalidName(String),
}

/// Payload used to register a branch.
#[derive(Debug, Deserialize, Validate)]
pub struct BranchForm {
    #[validate(length(min = 1, max = BRANCH_NAME_MAX_LEN))]
    pub name: String,
}

impl BranchForm {
    /// Lowercase alphanumeric branch name.
    pub fn into_name(self) -> Result<String, BranchFormError> {
        self.validate()?;
        normalize_branch_name(&self.name).ok_or(BranchFormError::InvalidName(self.name))
    }
}
