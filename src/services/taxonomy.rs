use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::{NewCustomCategory, Taxonomy, find_subcategory, is_builtin_category};
use crate::forms::categories::{AddCategoryForm, DeleteCategoryForm, SubcategoryForm};
use crate::repository::{CategoryReader, CategoryWriter, ProductReader};
use crate::services::products::load_taxonomy;
use crate::services::{ServiceError, ServiceResult};

fn require_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("Only admins may change categories"))
    }
}

fn in_use(count: usize, what: String) -> ServiceError {
    ServiceError::InUse {
        message: format!("Cannot delete {what}: {count} product(s) still use it"),
        count,
    }
}

/// Replace the subcategory list of `category`, creating a custom override when only the
/// built-in entry exists.
fn store_subcategories<R>(repo: &R, category: &str, subcategories: Vec<String>) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    if repo.get_custom_category(category)?.is_some() {
        repo.update_custom_subcategories(category, &subcategories)?;
    } else {
        repo.create_custom_category(&NewCustomCategory::new(category, subcategories))?;
    }
    Ok(())
}

/// Adds a custom category and returns the merged taxonomy.
pub fn add_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCategoryForm,
) -> ServiceResult<Taxonomy>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    require_admin(user)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if load_taxonomy(repo)?.contains_key(&input.name) {
        return Err(ServiceError::Conflict(format!(
            "Category `{}` already exists",
            input.name
        )));
    }

    repo.create_custom_category(&NewCustomCategory::new(&input.name, input.subcategories))?;
    log::info!("Category {} added by {}", input.name, user.sub);

    load_taxonomy(repo)
}

/// Deletes a custom category unless a product references it.
///
/// Deleting the override of a built-in category brings the default back.
pub fn delete_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DeleteCategoryForm,
) -> ServiceResult<Taxonomy>
where
    R: CategoryReader + CategoryWriter + ProductReader + ?Sized,
{
    require_admin(user)?;

    let name = form
        .into_name()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo.get_custom_category(&name)?.is_none() {
        if is_builtin_category(&name) {
            return Err(ServiceError::form(format!(
                "Built-in category `{name}` cannot be deleted"
            )));
        }
        return Err(ServiceError::not_found(format!("Category `{name}` not found")));
    }

    let count = repo.count_products_in_category(&name)?;
    if count > 0 {
        return Err(in_use(count, format!("category `{name}`")));
    }

    repo.delete_custom_category(&name)?;
    log::info!("Category {name} deleted by {}", user.sub);

    load_taxonomy(repo)
}

/// Appends a subcategory to an existing category.
pub fn add_subcategory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SubcategoryForm,
) -> ServiceResult<Taxonomy>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    require_admin(user)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let taxonomy = load_taxonomy(repo)?;
    let Some(existing) = taxonomy.get(&input.category) else {
        return Err(ServiceError::not_found(format!(
            "Category `{}` not found",
            input.category
        )));
    };

    if find_subcategory(existing, &input.subcategory).is_some() {
        return Err(ServiceError::Conflict(format!(
            "Subcategory `{}` already exists in `{}`",
            input.subcategory, input.category
        )));
    }

    let mut subcategories = existing.clone();
    subcategories.push(input.subcategory.clone());
    store_subcategories(repo, &input.category, subcategories)?;
    log::info!(
        "Subcategory {} added to {} by {}",
        input.subcategory,
        input.category,
        user.sub
    );

    load_taxonomy(repo)
}

/// Removes a subcategory unless a product references it.
pub fn delete_subcategory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SubcategoryForm,
) -> ServiceResult<Taxonomy>
where
    R: CategoryReader + CategoryWriter + ProductReader + ?Sized,
{
    require_admin(user)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let taxonomy = load_taxonomy(repo)?;
    let Some(existing) = taxonomy.get(&input.category) else {
        return Err(ServiceError::not_found(format!(
            "Category `{}` not found",
            input.category
        )));
    };

    let Some(stored) = find_subcategory(existing, &input.subcategory) else {
        return Err(ServiceError::not_found(format!(
            "Subcategory `{}` not found in `{}`",
            input.subcategory, input.category
        )));
    };

    let count = repo.count_products_in_subcategory(&input.category, stored)?;
    if count > 0 {
        return Err(in_use(
            count,
            format!("subcategory `{stored}` of `{}`", input.category),
        ));
    }

    let remaining: Vec<String> = existing
        .iter()
        .filter(|value| value.as_str() != stored)
        .cloned()
        .collect();
    store_subcategories(repo, &input.category, remaining)?;
    log::info!("Subcategory {stored} removed from {} by {}", input.category, user.sub);

    load_taxonomy(repo)
}
