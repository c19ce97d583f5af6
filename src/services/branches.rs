use crate::domain::auth::AuthenticatedUser;
use crate::domain::branch::{Branch, normalize_branch_name};
use crate::forms::branches::BranchForm;
use crate::repository::{BranchReader, BranchWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_branches<R>(repo: &R) -> ServiceResult<Vec<Branch>>
where
    R: BranchReader + ?Sized,
{
    Ok(repo.list_branches()?)
}

/// Registers a branch. Admins only.
pub fn add_branch<R>(repo: &R, user: &AuthenticatedUser, form: BranchForm) -> ServiceResult<Branch>
where
    R: BranchReader + BranchWriter + ?Sized,
{
    if !user.is_admin() {
        return Err(ServiceError::forbidden("Only admins may add branches"));
    }

    let name = form
        .into_name()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo.list_branches()?.iter().any(|branch| branch.name == name) {
        return Err(ServiceError::Conflict(format!("Branch `{name}` already exists")));
    }

    let branch = repo.create_branch(&name)?;
    log::info!("Branch {name} added by {}", user.sub);
    Ok(branch)
}

/// Removes a branch. Stock rows of products keep their entries for it.
pub fn delete_branch<R>(repo: &R, user: &AuthenticatedUser, name: &str) -> ServiceResult<()>
where
    R: BranchWriter + ?Sized,
{
    if !user.is_admin() {
        return Err(ServiceError::forbidden("Only admins may delete branches"));
    }

    let name = normalize_branch_name(name)
        .ok_or_else(|| ServiceError::form(format!("invalid branch `{}`", name.trim())))?;

    repo.delete_branch(&name).map_err(|err| match ServiceError::from(err) {
        ServiceError::NotFound(_) => ServiceError::not_found(format!("Branch `{name}` not found")),
        other => other,
    })?;
    log::info!("Branch {name} deleted by {}", user.sub);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{FakeRepo, fixed_datetime, user};

    fn branch(name: &str) -> Branch {
        Branch {
            id: 1,
            name: name.to_string(),
            created_at: fixed_datetime(),
        }
    }

    #[test]
    fn add_branch_normalizes_and_rejects_duplicates() {
        let mut repo = FakeRepo::new();
        repo.branches
            .expect_list_branches()
            .returning(|| Ok(vec![branch("mirpur")]));
        repo.branch_writer
            .expect_create_branch()
            .withf(|name| name == "uttara")
            .times(1)
            .returning(|name| Ok(branch(name)));

        let admin = user(Role::Admin);
        let created = add_branch(
            &repo,
            &admin,
            BranchForm {
                name: " Uttara ".to_string(),
            },
        )
        .expect("created");
        assert_eq!(created.name, "uttara");

        let duplicate = add_branch(
            &repo,
            &admin,
            BranchForm {
                name: "MIRPUR".to_string(),
            },
        );
        assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn branch_mutations_require_admin() {
        let repo = FakeRepo::new();
        let manager = user(Role::Manager);

        assert!(matches!(
            delete_branch(&repo, &manager, "mirpur"),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn deleting_missing_branch_is_not_found() {
        let mut repo = FakeRepo::new();
        repo.branch_writer
            .expect_delete_branch()
            .returning(|_| Err(RepositoryError::NotFound));

        let result = delete_branch(&repo, &user(Role::Admin), "gulshan");

        assert!(matches!(
            result,
            Err(ServiceError::NotFound(message)) if message.contains("gulshan")
        ));
    }

    #[test]
    fn deleting_malformed_branch_is_rejected() {
        let repo = FakeRepo::new();

        let result = delete_branch(&repo, &user(Role::Admin), "mir pur");

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
