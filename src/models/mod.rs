pub mod branch;
pub mod category;
pub mod featured_category;
pub mod offer_popup;
pub mod order;
pub mod product;
