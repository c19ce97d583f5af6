use chrono::NaiveDateTime;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::offer_popup::OfferPopup;
use crate::forms::offer_popup::OfferPopupForm;
use crate::forms::parse_id;
use crate::repository::{OfferPopupReader, OfferPopupWriter};
use crate::services::{ServiceError, ServiceResult};

fn require_catalog_role(user: &AuthenticatedUser) -> ServiceResult<()> {
    if user.can_manage_catalog() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("Only admins and managers may edit offer popups"))
    }
}

/// Newest popup that is switched on and inside its schedule at `now`.
pub fn current_offer_popup<R>(repo: &R, now: NaiveDateTime) -> ServiceResult<Option<OfferPopup>>
where
    R: OfferPopupReader + ?Sized,
{
    let popups = repo.list_offer_popups()?;
    Ok(popups.into_iter().find(|popup| popup.is_live_at(now)))
}

/// Every popup, newest first. Staff only.
pub fn list_offer_popups<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<OfferPopup>>
where
    R: OfferPopupReader + ?Sized,
{
    if !user.is_staff() {
        return Err(ServiceError::forbidden("Only staff may list offer popups"));
    }
    Ok(repo.list_offer_popups()?)
}

pub fn save_offer_popup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: OfferPopupForm,
) -> ServiceResult<OfferPopup>
where
    R: OfferPopupWriter + ?Sized,
{
    require_catalog_role(user)?;

    let (id, data) = form
        .into_data()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let saved = match id {
        Some(id) => repo.update_offer_popup(id, &data)?,
        None => repo.create_offer_popup(&data)?,
    };
    log::info!("Offer popup {} saved by {}", saved.id, user.sub);
    Ok(saved)
}

pub fn delete_offer_popup<R>(repo: &R, user: &AuthenticatedUser, id: &str) -> ServiceResult<()>
where
    R: OfferPopupWriter + ?Sized,
{
    require_catalog_role(user)?;

    let id = parse_id(id, "id").map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.delete_offer_popup(id)?;
    log::info!("Offer popup {id} deleted by {}", user.sub);
    Ok(())
}
