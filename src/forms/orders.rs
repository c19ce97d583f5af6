use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::branch::normalize_branch_name;
use crate::domain::order::OrderStatus;
use crate::forms::{
    IdInput, InvalidId, optional_inline, sanitize_inline_text, sanitize_multiline_text,
};

const NAME_MAX_LEN: u64 = 100;
const PHONE_MIN_LEN: u64 = 5;
const PHONE_MAX_LEN: u64 = 20;
const ADDRESS_MAX_LEN: u64 = 500;
const NOTES_MAX_LEN: u64 = 1000;
const MAX_LINES: u64 = 50;

pub type OrderFormResult<T> = Result<T, OrderFormError>;

#[derive(Debug, Error)]
pub enum OrderFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("phone number may only contain digits, spaces, `+` and `-`")]
    InvalidPhone,
    #[error("invalid branch `{0}`")]
    InvalidBranch(String),
    #[error("invalid order status `{0}`")]
    InvalidStatus(String),
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

/// One requested line of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineForm {
    pub product_id: IdInput,
    #[validate(range(min = 1, max = 100))]
    pub quantity: i32,
}

/// Checkout payload posted by the storefront.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub customer_name: String,
    #[validate(length(min = PHONE_MIN_LEN, max = PHONE_MAX_LEN))]
    pub customer_phone: String,
    #[validate(email)]
    pub customer_email: Option<String>,
    #[validate(length(min = 1, max = ADDRESS_MAX_LEN))]
    pub shipping_address: String,
    pub branch: Option<String>,
    #[validate(length(max = NOTES_MAX_LEN))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = MAX_LINES), nested)]
    pub items: Vec<CheckoutLineForm>,
}

/// Requested line after validation; the service snapshots the product into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// Validated checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub branch: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<CheckoutLine>,
}

impl CheckoutForm {
    pub fn into_checkout(self) -> OrderFormResult<Checkout> {
        self.validate()?;

        let customer_name = sanitize_inline_text(&self.customer_name);
        if customer_name.is_empty() {
            return Err(OrderFormError::Empty("customerName"));
        }

        let customer_phone = sanitize_inline_text(&self.customer_phone);
        if !customer_phone
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-'))
        {
            return Err(OrderFormError::InvalidPhone);
        }

        let shipping_address = sanitize_multiline_text(&self.shipping_address);
        if shipping_address.is_empty() {
            return Err(OrderFormError::Empty("shippingAddress"));
        }

        let branch = match optional_inline(self.branch.as_deref()) {
            Some(branch) => Some(
                normalize_branch_name(&branch).ok_or(OrderFormError::InvalidBranch(branch))?,
            ),
            None => None,
        };

        let lines = self
            .items
            .iter()
            .map(|line| {
                Ok(CheckoutLine {
                    product_id: line.product_id.resolve("productId")?,
                    quantity: line.quantity,
                })
            })
            .collect::<OrderFormResult<Vec<_>>>()?;

        Ok(Checkout {
            customer_name,
            customer_phone,
            customer_email: optional_inline(self.customer_email.as_deref()),
            shipping_address,
            branch,
            notes: self
                .notes
                .as_deref()
                .map(sanitize_multiline_text)
                .filter(|value| !value.is_empty()),
            lines,
        })
    }
}

/// Payload of `PATCH /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusForm {
    pub id: IdInput,
    pub status: String,
}

impl OrderStatusForm {
    pub fn into_parts(self) -> OrderFormResult<(i32, OrderStatus)> {
        let id = self.id.resolve("id")?;
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|_| OrderFormError::InvalidStatus(self.status.trim().to_string()))?;
        Ok((id, status))
    }
}
