use serde::Deserialize;

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::order::{NewOrder, Order, OrderItem, OrderListQuery, OrderStatus, UpdateOrder};
use crate::forms::orders::{CheckoutForm, OrderStatusForm};
use crate::forms::parse_id;
use crate::pagination::{Paginated, Pagination};
use crate::repository::{OrderReader, OrderWriter, ProductReader};
use crate::services::{ServiceError, ServiceResult};

/// Query string of `GET /api/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<String>,
}

/// Places an order. Anonymous checkouts are allowed; signed-in callers are recorded as the
/// customer.
pub fn place_order<R>(
    repo: &R,
    viewer: Option<&AuthenticatedUser>,
    form: CheckoutForm,
) -> ServiceResult<Order>
where
    R: ProductReader + OrderWriter + ?Sized,
{
    let checkout = form
        .into_checkout()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut items = Vec::with_capacity(checkout.lines.len());
    for line in &checkout.lines {
        let product = repo
            .get_product_by_id(line.product_id)?
            .filter(|product| product.is_active())
            .ok_or_else(|| {
                ServiceError::form(format!("Product {} is not available", line.product_id))
            })?;

        items.push(OrderItem {
            product_id: product.id,
            image_url: product.primary_image().map(|image| image.url.clone()),
            name: product.name,
            price_cents: product.price_cents,
            quantity: line.quantity,
        });
    }

    let new_order = NewOrder {
        customer_id: viewer.map(|user| user.sub.clone()),
        customer_name: checkout.customer_name,
        customer_phone: checkout.customer_phone,
        customer_email: checkout.customer_email,
        shipping_address: checkout.shipping_address,
        branch: checkout.branch,
        notes: checkout.notes,
        items,
        created_at: chrono::Utc::now().naive_utc(),
    };

    let order = repo.create_order(&new_order)?;
    log::info!("Order {} placed with {} line(s)", order.id, order.items.len());
    Ok(order)
}

/// Lists orders visible to `user`: customers see their own, moderators their branch.
pub fn list_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: OrdersQuery,
) -> ServiceResult<Paginated<Order>>
where
    R: OrderReader + ?Sized,
{
    let pagination = Pagination::from_params(query.page, query.limit);
    let mut list_query = OrderListQuery::new().paginate(pagination);

    list_query = match user.role {
        Role::Admin | Role::Manager => list_query,
        Role::Moderator => match user.branch.as_deref() {
            Some(branch) => list_query.branch(branch),
            None => return Err(ServiceError::forbidden("Moderator account has no branch assigned")),
        },
        Role::Customer => list_query.customer(&user.sub),
    };

    if let Some(status) = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
    {
        list_query = list_query.status(status.parse::<OrderStatus>().map_err(ServiceError::Form)?);
    }

    let (total, orders) = repo.list_orders(list_query)?;
    Ok(Paginated::new(orders, pagination, total))
}

/// Sets the status of an order. Moderators may only touch orders of their branch.
pub fn update_order_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: OrderStatusForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + ?Sized,
{
    if user.role == Role::Customer {
        return Err(ServiceError::forbidden("Customers may not change order status"));
    }

    let (order_id, status) = form
        .into_parts()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let order = repo
        .get_order_by_id(order_id)?
        .ok_or_else(|| ServiceError::not_found("Order not found"))?;

    if user.is_moderator() && (user.branch.is_none() || order.branch != user.branch) {
        return Err(ServiceError::forbidden(
            "Moderators may only update orders of their own branch",
        ));
    }

    let updated = repo.update_order(order_id, &UpdateOrder::new(status))?;
    log::info!("Order {order_id} set to {status} by {}", user.sub);
    Ok(updated)
}

/// Deletes an order. Admins only.
pub fn delete_order<R>(repo: &R, user: &AuthenticatedUser, order_id: &str) -> ServiceResult<()>
where
    R: OrderWriter + ?Sized,
{
    if !user.is_admin() {
        return Err(ServiceError::forbidden("Only admins may delete orders"));
    }

    let order_id = parse_id(order_id, "id").map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.delete_order(order_id)?;
    log::info!("Order {order_id} deleted by {}", user.sub);
    Ok(())
}
