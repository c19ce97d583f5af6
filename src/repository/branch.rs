use diesel::prelude::*;

use crate::domain::branch::Branch as DomainBranch;
use crate::models::branch::{Branch as DbBranch, NewBranch};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{BranchReader, BranchWriter, DieselRepository};
use crate::schema::branches;

impl BranchReader for DieselRepository {
    fn list_branches(&self) -> RepositoryResult<Vec<DomainBranch>> {
        let mut conn = self.conn()?;

        let rows = branches::table
            .order(branches::name.asc())
            .load::<DbBranch>(&mut conn)?;

        Ok(rows.into_iter().map(DomainBranch::from).collect())
    }
}

impl BranchWriter for DieselRepository {
    fn create_branch(&self, name: &str) -> RepositoryResult<DomainBranch> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(branches::table)
            .values(&NewBranch { name })
            .get_result::<DbBranch>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_branch(&self, name: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(branches::table.filter(branches::name.eq(name))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
