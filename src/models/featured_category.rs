use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::featured_category::{
    FeaturedCategory as DomainFeaturedCategory, FeaturedCategoryData,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::featured_categories)]
pub struct FeaturedCategory {
    pub id: i32,
    pub category: String,
    pub subcategory: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row values shared by inserts and full replacements.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::featured_categories)]
#[diesel(treat_none_as_null = true)]
pub struct FeaturedCategoryValues<'a> {
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub title: &'a str,
    pub image_url: Option<&'a str>,
    pub position: i32,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

impl From<FeaturedCategory> for DomainFeaturedCategory {
    fn from(value: FeaturedCategory) -> Self {
        Self {
            id: value.id,
            category: value.category,
            subcategory: value.subcategory,
            title: value.title,
            image_url: value.image_url,
            position: value.position,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a FeaturedCategoryData> for FeaturedCategoryValues<'a> {
    fn from(value: &'a FeaturedCategoryData) -> Self {
        Self {
            category: value.category.as_str(),
            subcategory: value.subcategory.as_deref(),
            title: value.title.as_str(),
            image_url: value.image_url.as_deref(),
            position: value.position,
            is_active: value.is_active,
            updated_at: value.updated_at,
        }
    }
}
