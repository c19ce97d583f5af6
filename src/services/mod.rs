pub use errors::{ServiceError, ServiceResult};

pub mod branches;
pub mod errors;
pub mod featured_categories;
pub mod images;
pub mod offer_popup;
pub mod orders;
pub mod products;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod test_support;
