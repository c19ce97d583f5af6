use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{
    NewOrder as DomainNewOrder, Order as DomainOrder, OrderItem as DomainOrderItem, OrderStatus,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub branch: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub customer_id: Option<&'a str>,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub customer_email: Option<&'a str>,
    pub shipping_address: &'a str,
    pub branch: Option<&'a str>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub product_id: i32,
    pub name: &'a str,
    pub price_cents: i64,
    pub quantity: i32,
    pub image_url: Option<&'a str>,
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> RepositoryResult<DomainOrder> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(RepositoryError::Corrupt)?;

        Ok(DomainOrder {
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            shipping_address: self.shipping_address,
            branch: self.branch,
            status,
            notes: self.notes,
            total_cents: self.total_cents,
            items: items.into_iter().map(DomainOrderItem::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            product_id: value.product_id,
            name: value.name,
            price_cents: value.price_cents,
            quantity: value.quantity,
            image_url: value.image_url,
        }
    }
}

impl<'a> From<&'a DomainNewOrder> for NewOrder<'a> {
    fn from(value: &'a DomainNewOrder) -> Self {
        Self {
            customer_id: value.customer_id.as_deref(),
            customer_name: value.customer_name.as_str(),
            customer_phone: value.customer_phone.as_str(),
            customer_email: value.customer_email.as_deref(),
            shipping_address: value.shipping_address.as_str(),
            branch: value.branch.as_deref(),
            status: OrderStatus::Pending.as_str(),
            notes: value.notes.as_deref(),
            total_cents: value.total_cents(),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_domain(order_id: i32, item: &'a DomainOrderItem) -> Self {
        Self {
            order_id,
            product_id: item.product_id,
            name: item.name.as_str(),
            price_cents: item.price_cents,
            quantity: item.quantity,
            image_url: item.image_url.as_deref(),
        }
    }
}
