use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::offer_popup::OfferPopupData;
use crate::forms::{
    IdInput, InvalidId, optional_inline, sanitize_inline_text, sanitize_multiline_text,
};

#[derive(Debug, Error)]
pub enum OfferPopupFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("endsAt must be later than startsAt")]
    InvalidWindow,
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

/// Create (no `id`) or replace (with `id`) an offer popup.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfferPopupForm {
    pub id: Option<IdInput>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    #[validate(url, length(max = 500))]
    pub image_url: Option<String>,
    #[validate(url, length(max = 500))]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// RFC 3339 timestamp.
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl OfferPopupForm {
    pub fn into_data(self) -> Result<(Option<i32>, OfferPopupData), OfferPopupFormError> {
        self.validate()?;

        let id = self.id.as_ref().map(|id| id.resolve("id")).transpose()?;

        let title = sanitize_inline_text(&self.title);
        if title.is_empty() {
            return Err(OfferPopupFormError::Empty("title"));
        }
        let message = sanitize_multiline_text(&self.message);
        if message.is_empty() {
            return Err(OfferPopupFormError::Empty("message"));
        }

        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at)
            && ends_at <= starts_at
        {
            return Err(OfferPopupFormError::InvalidWindow);
        }

        Ok((
            id,
            OfferPopupData {
                title,
                message,
                image_url: optional_inline(self.image_url.as_deref()),
                link_url: optional_inline(self.link_url.as_deref()),
                is_active: self.is_active,
                starts_at: self.starts_at.map(|value| value.naive_utc()),
                ends_at: self.ends_at.map(|value| value.naive_utc()),
                updated_at: Utc::now().naive_utc(),
            },
        ))
    }
}
