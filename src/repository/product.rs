use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::{
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct,
        ProductImage as DomainProductImage, ProductListQuery, ProductStatus,
        UpdateProduct as DomainUpdateProduct,
    },
    models::product::{
        NewProduct as DbNewProduct, NewProductImage, NewProductStock, Product as DbProduct,
        ProductImage as DbProductImage, ProductStock as DbProductStock,
        UpdateProduct as DbUpdateProduct, stock_rows,
    },
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, ProductReader, ProductWriter, escape_like},
    schema::{product_images, product_stocks, products},
};

/// Products matching the filters of `query`, without ordering or pagination.
fn filtered_products(query: &ProductListQuery) -> products::BoxedQuery<'static, Sqlite> {
    let mut items = products::table.into_boxed::<Sqlite>();

    if let Some(status) = query.status {
        items = items.filter(products::status.eq(status.as_str()));
    }

    if let Some(category) = query.category.as_deref() {
        items = items.filter(products::category.like(escape_like(category.trim())).escape('\\'));
    }

    if let Some(subcategory) = query.subcategory.as_deref() {
        items = items.filter(
            products::subcategory
                .like(escape_like(subcategory.trim()))
                .escape('\\'),
        );
    }

    if let Some(term) = query.search.as_deref() {
        let pattern = format!("%{}%", escape_like(term));
        items = items.filter(
            products::name
                .like(pattern.clone())
                .escape('\\')
                .or(products::description.like(pattern.clone()).escape('\\'))
                .or(products::brand.like(pattern.clone()).escape('\\'))
                .or(products::flavor.like(pattern).escape('\\')),
        );
    }

    if query.in_stock {
        match query.branch.clone() {
            Some(branch) => {
                items = items.filter(
                    products::id.eq_any(
                        product_stocks::table
                            .filter(product_stocks::branch.eq(branch))
                            .filter(product_stocks::quantity.gt(0))
                            .select(product_stocks::product_id),
                    ),
                );
            }
            None => {
                items = items.filter(
                    products::id.eq_any(
                        product_stocks::table
                            .filter(product_stocks::quantity.gt(0))
                            .select(product_stocks::product_id),
                    ),
                );
            }
        }
    }

    items
}

fn load_stocks_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DbProductStock>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_stocks::table
        .filter(product_stocks::product_id.eq_any(product_ids))
        .order(product_stocks::branch.asc())
        .load::<DbProductStock>(conn)?;

    let mut map: HashMap<i32, Vec<DbProductStock>> = HashMap::new();
    for row in rows {
        map.entry(row.product_id).or_default().push(row);
    }

    Ok(map)
}

fn load_images_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DbProductImage>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_images::table
        .filter(product_images::product_id.eq_any(product_ids))
        .order((product_images::position.asc(), product_images::id.asc()))
        .load::<DbProductImage>(conn)?;

    let mut map: HashMap<i32, Vec<DbProductImage>> = HashMap::new();
    for row in rows {
        map.entry(row.product_id).or_default().push(row);
    }

    Ok(map)
}

/// Attach stock and image rows to product rows, keeping the input order.
fn hydrate(
    conn: &mut SqliteConnection,
    db_products: Vec<DbProduct>,
) -> RepositoryResult<Vec<DomainProduct>> {
    let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
    let mut stocks = load_stocks_for_products(conn, &product_ids)?;
    let mut images = load_images_for_products(conn, &product_ids)?;

    db_products
        .into_iter()
        .map(|db_product| {
            let id = db_product.id;
            db_product.into_domain(
                stocks.remove(&id).unwrap_or_default(),
                images.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

fn load_product(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<Option<DomainProduct>> {
    let product = products::table
        .find(product_id)
        .first::<DbProduct>(conn)
        .optional()?;

    match product {
        Some(db_product) => Ok(hydrate(conn, vec![db_product])?.pop()),
        None => Ok(None),
    }
}

fn require_product(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<DomainProduct> {
    load_product(conn, product_id)?.ok_or(RepositoryError::NotFound)
}

fn insert_images(
    conn: &mut SqliteConnection,
    product_id: i32,
    first_position: i32,
    images: &[DomainProductImage],
) -> RepositoryResult<()> {
    if images.is_empty() {
        return Ok(());
    }

    let rows: Vec<NewProductImage> = images
        .iter()
        .zip(first_position..)
        .map(|(image, position)| NewProductImage {
            product_id,
            position,
            url: image.url.as_str(),
            public_id: image.public_id.as_str(),
            alt_text: image.alt.as_str(),
        })
        .collect();

    diesel::insert_into(product_images::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

fn touch_product(
    conn: &mut SqliteConnection,
    product_id: i32,
    updated_by: &str,
) -> RepositoryResult<()> {
    let touched = diesel::update(products::table.find(product_id))
        .set((
            products::updated_by.eq(updated_by),
            products::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    if touched == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;
        load_product(&mut conn, id)
    }

    fn get_product_by_barcode(&self, barcode: &str) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;

        let exact = products::table
            .filter(products::barcode.eq(barcode))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let found = match exact {
            Some(product) => Some(product),
            None => products::table
                .filter(products::barcode.like(escape_like(barcode)).escape('\\'))
                .order(products::id.asc())
                .first::<DbProduct>(&mut conn)
                .optional()?,
        };

        match found {
            Some(db_product) => Ok(hydrate(&mut conn, vec![db_product])?.pop()),
            None => Ok(None),
        }
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        let mut conn = self.conn()?;

        let total = filtered_products(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_products(&query)
            .order((products::created_at.desc(), products::id.desc()));

        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_products = items.load::<DbProduct>(&mut conn)?;

        if db_products.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, hydrate(&mut conn, db_products)?))
    }

    fn count_products_in_category(&self, category: &str) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let count = products::table
            .filter(products::category.like(escape_like(category.trim())).escape('\\'))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count as usize)
    }

    fn count_products_in_subcategory(
        &self,
        category: &str,
        subcategory: &str,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let count = products::table
            .filter(products::category.like(escape_like(category.trim())).escape('\\'))
            .filter(
                products::subcategory
                    .like(escape_like(subcategory.trim()))
                    .escape('\\'),
            )
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count as usize)
    }

    fn list_stock_branches(&self) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn()?;

        let branches = product_stocks::table
            .inner_join(products::table)
            .filter(products::status.eq(ProductStatus::Active.as_str()))
            .select(product_stocks::branch)
            .distinct()
            .order(product_stocks::branch.asc())
            .load::<String>(&mut conn)?;

        Ok(branches)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_new = DbNewProduct::try_from(new_product)?;
            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            let rows = stock_rows(&new_product.stock);
            let stocks: Vec<NewProductStock> = rows
                .iter()
                .map(|(branch, quantity)| NewProductStock {
                    product_id: created.id,
                    branch: branch.as_str(),
                    quantity: *quantity,
                })
                .collect();

            if !stocks.is_empty() {
                diesel::insert_into(product_stocks::table)
                    .values(&stocks)
                    .execute(conn)?;
            }

            require_product(conn, created.id)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_updates = DbUpdateProduct::try_from(updates)?;
            diesel::update(products::table.find(product_id))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            if let Some(stock) = updates.stock.as_ref() {
                for (branch, quantity) in stock_rows(stock) {
                    diesel::insert_into(product_stocks::table)
                        .values(&NewProductStock {
                            product_id,
                            branch: branch.as_str(),
                            quantity,
                        })
                        .on_conflict((product_stocks::product_id, product_stocks::branch))
                        .do_update()
                        .set(product_stocks::quantity.eq(quantity))
                        .execute(conn)?;
                }
            }

            if let Some(images) = updates.images.as_ref() {
                diesel::delete(
                    product_images::table.filter(product_images::product_id.eq(product_id)),
                )
                .execute(conn)?;
                insert_images(conn, product_id, 0, images)?;
            }

            require_product(conn, product_id)
        })
    }

    fn append_product_images(
        &self,
        product_id: i32,
        images: &[DomainProductImage],
        updated_by: &str,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            touch_product(conn, product_id, updated_by)?;

            let next_position = product_images::table
                .filter(product_images::product_id.eq(product_id))
                .select(diesel::dsl::max(product_images::position))
                .first::<Option<i32>>(conn)?
                .map_or(0, |position| position + 1);

            insert_images(conn, product_id, next_position, images)?;
            require_product(conn, product_id)
        })
    }

    fn remove_product_image(
        &self,
        product_id: i32,
        public_id: &str,
        updated_by: &str,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let removed = diesel::delete(
                product_images::table
                    .filter(product_images::product_id.eq(product_id))
                    .filter(product_images::public_id.eq(public_id)),
            )
            .execute(conn)?;

            if removed == 0 {
                return Err(RepositoryError::NotFound);
            }

            touch_product(conn, product_id, updated_by)?;
            require_product(conn, product_id)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(products::table.find(product_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
