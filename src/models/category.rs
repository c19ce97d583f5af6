use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{
    CustomCategory as DomainCustomCategory, NewCustomCategory as DomainNewCustomCategory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::custom_categories)]
pub struct CustomCategory {
    pub id: i32,
    pub name: String,
    pub subcategories: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::custom_categories)]
pub struct NewCustomCategory<'a> {
    pub name: &'a str,
    pub subcategories: String,
}

impl TryFrom<CustomCategory> for DomainCustomCategory {
    type Error = RepositoryError;

    fn try_from(value: CustomCategory) -> RepositoryResult<Self> {
        Ok(Self {
            id: value.id,
            name: value.name,
            subcategories: serde_json::from_str(&value.subcategories)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewCustomCategory> for NewCustomCategory<'a> {
    type Error = RepositoryError;

    fn try_from(value: &'a DomainNewCustomCategory) -> RepositoryResult<Self> {
        Ok(Self {
            name: value.name.as_str(),
            subcategories: serde_json::to_string(&value.subcategories)?,
        })
    }
}
