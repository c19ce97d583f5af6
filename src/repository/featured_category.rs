use diesel::prelude::*;

use crate::domain::featured_category::{
    FeaturedCategory as DomainFeaturedCategory, FeaturedCategoryData,
};
use crate::models::featured_category::{
    FeaturedCategory as DbFeaturedCategory, FeaturedCategoryValues,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, FeaturedCategoryReader, FeaturedCategoryWriter};
use crate::schema::featured_categories;

impl FeaturedCategoryReader for DieselRepository {
    fn list_featured_categories(
        &self,
        active_only: bool,
    ) -> RepositoryResult<Vec<DomainFeaturedCategory>> {
        let mut conn = self.conn()?;

        let mut query = featured_categories::table.into_boxed::<diesel::sqlite::Sqlite>();
        if active_only {
            query = query.filter(featured_categories::is_active.eq(true));
        }

        let rows = query
            .order((featured_categories::position.asc(), featured_categories::id.asc()))
            .load::<DbFeaturedCategory>(&mut conn)?;

        Ok(rows.into_iter().map(DomainFeaturedCategory::from).collect())
    }

    fn get_featured_category(&self, id: i32) -> RepositoryResult<Option<DomainFeaturedCategory>> {
        let mut conn = self.conn()?;

        let row = featured_categories::table
            .find(id)
            .first::<DbFeaturedCategory>(&mut conn)
            .optional()?;

        Ok(row.map(DomainFeaturedCategory::from))
    }
}

impl FeaturedCategoryWriter for DieselRepository {
    fn create_featured_category(
        &self,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<DomainFeaturedCategory> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(featured_categories::table)
            .values(&FeaturedCategoryValues::from(data))
            .get_result::<DbFeaturedCategory>(&mut conn)?;

        Ok(created.into())
    }

    fn update_featured_category(
        &self,
        id: i32,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<DomainFeaturedCategory> {
        let mut conn = self.conn()?;

        let updated = diesel::update(featured_categories::table.find(id))
            .set(&FeaturedCategoryValues::from(data))
            .get_result::<DbFeaturedCategory>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_featured_category(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(featured_categories::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
