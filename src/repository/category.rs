use chrono::Utc;
use diesel::prelude::*;

use crate::domain::category::{
    CustomCategory as DomainCustomCategory, NewCustomCategory as DomainNewCustomCategory,
    normalize_category_name,
};
use crate::models::category::{
    CustomCategory as DbCustomCategory, NewCustomCategory as DbNewCustomCategory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository};
use crate::schema::custom_categories;

impl CategoryReader for DieselRepository {
    fn list_custom_categories(&self) -> RepositoryResult<Vec<DomainCustomCategory>> {
        let mut conn = self.conn()?;

        let rows = custom_categories::table
            .order(custom_categories::name.asc())
            .load::<DbCustomCategory>(&mut conn)?;

        rows.into_iter().map(DomainCustomCategory::try_from).collect()
    }

    fn get_custom_category(&self, name: &str) -> RepositoryResult<Option<DomainCustomCategory>> {
        let mut conn = self.conn()?;

        let row = custom_categories::table
            .filter(custom_categories::name.eq(normalize_category_name(name)))
            .first::<DbCustomCategory>(&mut conn)
            .optional()?;

        row.map(DomainCustomCategory::try_from).transpose()
    }
}

impl CategoryWriter for DieselRepository {
    fn create_custom_category(
        &self,
        new_category: &DomainNewCustomCategory,
    ) -> RepositoryResult<DomainCustomCategory> {
        let mut conn = self.conn()?;

        let insertable = DbNewCustomCategory::try_from(new_category)?;
        let created = diesel::insert_into(custom_categories::table)
            .values(&insertable)
            .get_result::<DbCustomCategory>(&mut conn)?;

        created.try_into()
    }

    fn update_custom_subcategories(
        &self,
        name: &str,
        subcategories: &[String],
    ) -> RepositoryResult<DomainCustomCategory> {
        let mut conn = self.conn()?;

        let encoded = serde_json::to_string(subcategories)?;
        let updated = diesel::update(
            custom_categories::table
                .filter(custom_categories::name.eq(normalize_category_name(name))),
        )
        .set((
            custom_categories::subcategories.eq(encoded),
            custom_categories::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbCustomCategory>(&mut conn)?;

        updated.try_into()
    }

    fn delete_custom_category(&self, name: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            custom_categories::table
                .filter(custom_categories::name.eq(normalize_category_name(name))),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
