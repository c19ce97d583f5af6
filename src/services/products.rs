use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::branch::{DEFAULT_BRANCHES, normalize_branch_name, stock_key};
use crate::domain::category::{Taxonomy, find_subcategory, merge_taxonomy};
use crate::domain::product::{
    BranchSpecification, Product, ProductImage, ProductListQuery, ProductStatus, StockMap,
};
use crate::forms::parse_id;
use crate::forms::products::ProductForm;
use crate::pagination::{Pagination, PaginationMeta};
use crate::repository::{BranchReader, CategoryReader, ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

const SEARCH_MAX_LEN: usize = 100;
const BARCODE_MAX_LEN: usize = 64;

/// Which slice of a product the caller is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Anonymous visitors and customers: active products, no inventory or audit fields.
    Public,
    /// Moderators: stock collapsed to their own branch.
    Branch(String),
    /// Admins and managers.
    Full,
}

impl Audience {
    pub fn for_viewer(viewer: Option<&AuthenticatedUser>) -> ServiceResult<Self> {
        let Some(user) = viewer else {
            return Ok(Audience::Public);
        };

        match user.role {
            Role::Admin | Role::Manager => Ok(Audience::Full),
            Role::Moderator => user
                .branch
                .clone()
                .map(Audience::Branch)
                .ok_or_else(|| ServiceError::forbidden("Moderator account has no branch assigned")),
            Role::Customer => Ok(Audience::Public),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Audience::Public)
    }
}

/// Product as returned over the API. Fields left `None` are omitted from the JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub tags: Vec<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub nicotine_strength: Option<String>,
    pub vg_pg_ratio: Option<String>,
    pub flavor: Option<String>,
    pub resistance: Option<String>,
    pub wattage_range: Option<String>,
    pub branch_specifications: BTreeMap<String, BranchSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<StockMap>,
    pub images: Vec<ProductImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Project `product` onto what `audience` may see. Every product response goes through here.
pub fn shape(product: Product, audience: &Audience) -> ProductView {
    let (stock, barcode, status, created_by, updated_by) = match audience {
        Audience::Public => (None, None, None, None, None),
        Audience::Branch(branch) => {
            let quantity = product.stock_for_branch(branch);
            (
                Some(StockMap::from([(stock_key(branch), quantity)])),
                product.barcode,
                Some(product.status),
                product.created_by,
                product.updated_by,
            )
        }
        Audience::Full => (
            Some(product.stock),
            product.barcode,
            Some(product.status),
            product.created_by,
            product.updated_by,
        ),
    };

    ProductView {
        id: product.id,
        name: product.name,
        description: product.description,
        brand: product.brand,
        category: product.category,
        subcategory: product.subcategory,
        barcode,
        tags: product.tags,
        price: cents_to_amount(product.price_cents),
        compare_at_price: product.compare_at_price_cents.map(cents_to_amount),
        nicotine_strength: product.nicotine_strength,
        vg_pg_ratio: product.vg_pg_ratio,
        flavor: product.flavor,
        resistance: product.resistance,
        wattage_range: product.wattage_range,
        branch_specifications: product.branch_specifications,
        stock,
        images: product.images,
        status,
        created_by,
        updated_by,
        created_at: product.created_at,
        updated_at: product.updated_at,
    }
}

/// Query string of `GET /api/products`. Values stay raw so validation errors use the API envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    pub id: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub branch: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub in_stock: Option<String>,
    pub get_categories_only: Option<String>,
    pub get_branches_only: Option<String>,
}

/// The four response shapes of the read path.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProductsResponse {
    Categories {
        categories: Taxonomy,
    },
    Branches {
        branches: Vec<String>,
    },
    Single {
        product: ProductView,
    },
    List {
        products: Vec<ProductView>,
        pagination: PaginationMeta,
    },
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_count(value: Option<&str>, field: &str) -> ServiceResult<Option<usize>> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ServiceError::form(format!("invalid {field} `{raw}`"))),
    }
}

/// Serves `GET /api/products` for `viewer` (`None` for anonymous callers).
pub fn read_products<R>(
    repo: &R,
    viewer: Option<&AuthenticatedUser>,
    query: ProductsQuery,
) -> ServiceResult<ProductsResponse>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    if flag(query.get_categories_only.as_deref()) {
        return Ok(ProductsResponse::Categories {
            categories: load_taxonomy(repo)?,
        });
    }

    if flag(query.get_branches_only.as_deref()) {
        return Ok(ProductsResponse::Branches {
            branches: list_branch_names(repo)?,
        });
    }

    let audience = Audience::for_viewer(viewer)?;

    let branch_filter = match non_blank(query.branch) {
        Some(raw) => Some(
            normalize_branch_name(&raw)
                .ok_or_else(|| ServiceError::form(format!("invalid branch `{raw}`")))?,
        ),
        None => None,
    };

    if let (Audience::Branch(own), Some(requested)) = (&audience, branch_filter.as_ref())
        && own != requested
    {
        return Err(ServiceError::forbidden(
            "Moderators may only view stock of their own branch",
        ));
    }

    if let Some(raw_id) = non_blank(query.id) {
        let id = parse_id(&raw_id, "id").map_err(|err| ServiceError::Form(err.to_string()))?;
        let product = repo.get_product_by_id(id)?;
        return single_product(product, audience);
    }

    if let Some(barcode) = non_blank(query.barcode) {
        if barcode.chars().count() > BARCODE_MAX_LEN {
            return Err(ServiceError::form("barcode is too long"));
        }
        let product = repo.get_product_by_barcode(&barcode)?;
        return single_product(product, audience);
    }

    let mut list_query = ProductListQuery::new();

    if let Some(search) = non_blank(query.search) {
        if search.chars().count() > SEARCH_MAX_LEN {
            return Err(ServiceError::form(format!(
                "search must be at most {SEARCH_MAX_LEN} characters"
            )));
        }
        list_query = list_query.search(search);
    }

    if let Some(category) = non_blank(query.category) {
        list_query = list_query.category(category);
    }

    if let Some(subcategory) = non_blank(query.subcategory) {
        list_query = list_query.subcategory(subcategory);
    }

    if audience.is_public() {
        list_query = list_query.status(ProductStatus::Active);
    } else if let Some(status) = non_blank(query.status)
        && !status.eq_ignore_ascii_case("all")
    {
        let status = status
            .parse::<ProductStatus>()
            .map_err(ServiceError::Form)?;
        list_query = list_query.status(status);
    }

    let effective_branch = match (&audience, branch_filter) {
        (_, Some(branch)) => Some(branch),
        (Audience::Branch(own), None) => Some(own.clone()),
        _ => None,
    };
    if let Some(branch) = effective_branch {
        list_query = list_query.branch(branch);
    }

    if flag(query.in_stock.as_deref()) {
        list_query = list_query.in_stock();
    }

    let pagination = Pagination::from_params(
        parse_count(query.page.as_deref(), "page")?,
        parse_count(query.limit.as_deref(), "limit")?,
    );
    list_query.pagination = Some(pagination);

    let (total, products) = repo.list_products(list_query)?;

    Ok(ProductsResponse::List {
        products: products
            .into_iter()
            .map(|product| shape(product, &audience))
            .collect(),
        pagination: PaginationMeta::new(pagination, total),
    })
}

fn single_product(product: Option<Product>, audience: Audience) -> ServiceResult<ProductsResponse> {
    match product {
        Some(product) if !audience.is_public() || product.is_active() => {
            Ok(ProductsResponse::Single {
                product: shape(product, &audience),
            })
        }
        _ => Err(ServiceError::not_found("Product not found")),
    }
}

/// Built-in categories merged with the persisted custom ones.
pub fn load_taxonomy<R>(repo: &R) -> ServiceResult<Taxonomy>
where
    R: CategoryReader + ?Sized,
{
    let custom = repo.list_custom_categories()?;
    Ok(merge_taxonomy(&custom))
}

/// Branch names found in the stock of active products, or the default pair when there are none.
pub fn list_branch_names<R>(repo: &R) -> ServiceResult<Vec<String>>
where
    R: ProductReader + ?Sized,
{
    let branches = repo.list_stock_branches()?;
    if branches.is_empty() {
        return Ok(DEFAULT_BRANCHES.iter().map(|name| name.to_string()).collect());
    }
    Ok(branches)
}

/// Check `category`/`subcategory` against the taxonomy and return the stored subcategory spelling.
pub(crate) fn resolve_taxonomy(
    taxonomy: &Taxonomy,
    category: &str,
    subcategory: Option<&str>,
) -> ServiceResult<Option<String>> {
    let Some(subcategories) = taxonomy.get(category) else {
        return Err(ServiceError::form(format!("Unknown category `{category}`")));
    };

    match subcategory {
        None => Ok(None),
        Some(subcategory) => find_subcategory(subcategories, subcategory)
            .map(|stored| Some(stored.to_string()))
            .ok_or_else(|| {
                ServiceError::form(format!(
                    "Subcategory `{subcategory}` is not listed under `{category}`"
                ))
            }),
    }
}

/// Creates a product. Admins and managers only.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + BranchReader + ?Sized,
{
    if !user.can_manage_catalog() {
        return Err(ServiceError::forbidden("Only admins and managers may create products"));
    }

    let mut payload = form
        .into_new_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let taxonomy = load_taxonomy(repo)?;
    payload.subcategory =
        resolve_taxonomy(&taxonomy, &payload.category, payload.subcategory.as_deref())?;

    if let Some(barcode) = payload.barcode.as_deref()
        && repo.get_product_by_barcode(barcode)?.is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "A product with barcode `{barcode}` already exists"
        )));
    }

    for branch in repo.list_branches()? {
        payload.stock.entry(stock_key(&branch.name)).or_insert(0);
    }

    payload.created_by = Some(user.sub.clone());

    let product = repo.create_product(&payload)?;
    log::info!("Product {} created by {}", product.id, user.sub);
    Ok(product)
}

/// Applies a partial update to a product. Admins and managers only.
pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + ?Sized,
{
    if !user.can_manage_catalog() {
        return Err(ServiceError::forbidden("Only admins and managers may update products"));
    }

    let (product_id, mut updates) = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let existing = repo
        .get_product_by_id(product_id)?
        .ok_or_else(|| ServiceError::not_found("Product not found"))?;

    if updates.category.is_some() || updates.subcategory.is_some() {
        let category = updates.category.as_deref().unwrap_or(&existing.category);
        let subcategory = match updates.subcategory.as_ref() {
            Some(value) => value.as_deref(),
            None => existing.subcategory.as_deref(),
        };

        let taxonomy = load_taxonomy(repo)?;
        let resolved = resolve_taxonomy(&taxonomy, category, subcategory)?;
        if updates.subcategory.is_some() {
            updates.subcategory = Some(resolved);
        }
    }

    if let Some(barcode) = updates.new_barcode()
        && let Some(owner) = repo.get_product_by_barcode(barcode)?
        && owner.id != product_id
    {
        return Err(ServiceError::Conflict(format!(
            "Barcode `{barcode}` is already used by another product"
        )));
    }

    updates.updated_by = Some(user.sub.clone());

    let product = repo.update_product(product_id, &updates)?;
    log::info!("Product {} updated by {}", product.id, user.sub);
    Ok(product)
}
