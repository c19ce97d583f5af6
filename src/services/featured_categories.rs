use crate::domain::auth::AuthenticatedUser;
use crate::domain::featured_category::FeaturedCategory;
use crate::forms::featured_categories::FeaturedCategoryForm;
use crate::forms::parse_id;
use crate::repository::{CategoryReader, FeaturedCategoryReader, FeaturedCategoryWriter};
use crate::services::products::{load_taxonomy, resolve_taxonomy};
use crate::services::{ServiceError, ServiceResult};

/// Featured tiles in display order. Only staff see inactive ones.
pub fn list_featured_categories<R>(
    repo: &R,
    viewer: Option<&AuthenticatedUser>,
) -> ServiceResult<Vec<FeaturedCategory>>
where
    R: FeaturedCategoryReader + ?Sized,
{
    let active_only = !viewer.is_some_and(AuthenticatedUser::is_staff);
    Ok(repo.list_featured_categories(active_only)?)
}

/// Creates a tile, or replaces the one named by `id`.
pub fn save_featured_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: FeaturedCategoryForm,
) -> ServiceResult<FeaturedCategory>
where
    R: FeaturedCategoryWriter + CategoryReader + ?Sized,
{
    if !user.can_manage_catalog() {
        return Err(ServiceError::forbidden(
            "Only admins and managers may edit featured categories",
        ));
    }

    let (id, mut data) = form
        .into_data()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let taxonomy = load_taxonomy(repo)?;
    data.subcategory = resolve_taxonomy(&taxonomy, &data.category, data.subcategory.as_deref())?;

    let saved = match id {
        Some(id) => repo.update_featured_category(id, &data)?,
        None => repo.create_featured_category(&data)?,
    };
    log::info!("Featured category {} saved by {}", saved.id, user.sub);
    Ok(saved)
}

pub fn delete_featured_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: &str,
) -> ServiceResult<()>
where
    R: FeaturedCategoryWriter + ?Sized,
{
    if !user.can_manage_catalog() {
        return Err(ServiceError::forbidden(
            "Only admins and managers may edit featured categories",
        ));
    }

    let id = parse_id(id, "id").map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.delete_featured_category(id)?;
    log::info!("Featured category {id} deleted by {}", user.sub);
    Ok(())
}
