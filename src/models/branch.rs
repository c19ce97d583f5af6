use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::branch::Branch as DomainBranch;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::branches)]
pub struct Branch {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::branches)]
pub struct NewBranch<'a> {
    pub name: &'a str,
}

impl From<Branch> for DomainBranch {
    fn from(value: Branch) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
        }
    }
}
