use diesel::prelude::*;

use crate::domain::offer_popup::{OfferPopup as DomainOfferPopup, OfferPopupData};
use crate::models::offer_popup::{OfferPopup as DbOfferPopup, OfferPopupValues};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OfferPopupReader, OfferPopupWriter};
use crate::schema::offer_popups;

impl OfferPopupReader for DieselRepository {
    fn list_offer_popups(&self) -> RepositoryResult<Vec<DomainOfferPopup>> {
        let mut conn = self.conn()?;

        let rows = offer_popups::table
            .order((offer_popups::created_at.desc(), offer_popups::id.desc()))
            .load::<DbOfferPopup>(&mut conn)?;

        Ok(rows.into_iter().map(DomainOfferPopup::from).collect())
    }

    fn get_offer_popup(&self, id: i32) -> RepositoryResult<Option<DomainOfferPopup>> {
        let mut conn = self.conn()?;

        let row = offer_popups::table
            .find(id)
            .first::<DbOfferPopup>(&mut conn)
            .optional()?;

        Ok(row.map(DomainOfferPopup::from))
    }
}

impl OfferPopupWriter for DieselRepository {
    fn create_offer_popup(&self, data: &OfferPopupData) -> RepositoryResult<DomainOfferPopup> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(offer_popups::table)
            .values(&OfferPopupValues::from(data))
            .get_result::<DbOfferPopup>(&mut conn)?;

        Ok(created.into())
    }

    fn update_offer_popup(
        &self,
        id: i32,
        data: &OfferPopupData,
    ) -> RepositoryResult<DomainOfferPopup> {
        let mut conn = self.conn()?;

        let updated = diesel::update(offer_popups::table.find(id))
            .set(&OfferPopupValues::from(data))
            .get_result::<DbOfferPopup>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_offer_popup(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(offer_popups::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
