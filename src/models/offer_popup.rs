use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::offer_popup::{OfferPopup as DomainOfferPopup, OfferPopupData};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::offer_popups)]
pub struct OfferPopup {
    pub id: i32,
    pub title: String,
    pub message: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row values shared by inserts and full replacements.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::offer_popups)]
#[diesel(treat_none_as_null = true)]
pub struct OfferPopupValues<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub image_url: Option<&'a str>,
    pub link_url: Option<&'a str>,
    pub is_active: bool,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl From<OfferPopup> for DomainOfferPopup {
    fn from(value: OfferPopup) -> Self {
        Self {
            id: value.id,
            title: value.title,
            message: value.message,
            image_url: value.image_url,
            link_url: value.link_url,
            is_active: value.is_active,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a OfferPopupData> for OfferPopupValues<'a> {
    fn from(value: &'a OfferPopupData) -> Self {
        Self {
            title: value.title.as_str(),
            message: value.message.as_str(),
            image_url: value.image_url.as_deref(),
            link_url: value.link_url.as_deref(),
            is_active: value.is_active,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            updated_at: value.updated_at,
        }
    }
}
