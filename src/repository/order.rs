use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::{
    domain::order::{
        NewOrder as DomainNewOrder, Order as DomainOrder, OrderListQuery,
        UpdateOrder as DomainUpdateOrder,
    },
    models::order::{
        NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
        OrderItem as DbOrderItem,
    },
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, OrderReader, OrderWriter},
    schema::{order_items, orders},
};

fn filtered_orders(query: &OrderListQuery) -> orders::BoxedQuery<'static, Sqlite> {
    let mut items = orders::table.into_boxed::<Sqlite>();

    if let Some(customer_id) = query.customer_id.clone() {
        items = items.filter(orders::customer_id.eq(customer_id));
    }

    if let Some(branch) = query.branch.clone() {
        items = items.filter(orders::branch.eq(branch));
    }

    if let Some(status) = query.status {
        items = items.filter(orders::status.eq(status.as_str()));
    }

    items
}

fn hydrate(
    conn: &mut SqliteConnection,
    db_orders: Vec<DbOrder>,
) -> RepositoryResult<Vec<DomainOrder>> {
    let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();

    let rows = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?;

    let mut items: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();
    for row in rows {
        items.entry(row.order_id).or_default().push(row);
    }

    db_orders
        .into_iter()
        .map(|order| {
            let id = order.id;
            order.into_domain(items.remove(&id).unwrap_or_default())
        })
        .collect()
}

fn load_order(conn: &mut SqliteConnection, order_id: i32) -> RepositoryResult<Option<DomainOrder>> {
    let order = orders::table
        .find(order_id)
        .first::<DbOrder>(conn)
        .optional()?;

    let Some(order) = order else {
        return Ok(None);
    };

    Ok(hydrate(conn, vec![order])?.pop())
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        let mut conn = self.conn()?;
        load_order(&mut conn, id)
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        let mut conn = self.conn()?;

        let total = filtered_orders(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items =
            filtered_orders(&query).order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        if db_orders.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, hydrate(&mut conn, db_orders)?))
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(orders::table)
                .values(&DbNewOrder::from(new_order))
                .get_result::<DbOrder>(conn)?;

            let lines: Vec<DbNewOrderItem> = new_order
                .items
                .iter()
                .map(|item| DbNewOrderItem::from_domain(created.id, item))
                .collect();

            if !lines.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&lines)
                    .execute(conn)?;
            }

            load_order(conn, created.id)?.ok_or(RepositoryError::NotFound)
        })
    }

    fn update_order(
        &self,
        order_id: i32,
        updates: &DomainUpdateOrder,
    ) -> RepositoryResult<DomainOrder> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let updated = diesel::update(orders::table.find(order_id))
                .set((
                    orders::status.eq(updates.status.as_str()),
                    orders::updated_at.eq(updates.updated_at),
                ))
                .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            load_order(conn, order_id)?.ok_or(RepositoryError::NotFound)
        })
    }

    fn delete_order(&self, order_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(orders::table.find(order_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
