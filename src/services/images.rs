//! Image upload and the delete path. Remote media and database rows are updated in two
//! steps; a failed database write after a successful upload deletes the fresh assets again.

use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::product::{MAX_PRODUCT_IMAGES, Product, ProductImage};
use crate::forms::parse_id;
use crate::forms::uploads::{ImageFile, MAX_FILES_PER_UPLOAD, max_file_bytes, parse_public_id};
use crate::media::MediaStore;
use crate::rate_limit::RateLimiter;
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// A file that reached the media store and was attached to the product.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub file_name: String,
    pub url: String,
    pub public_id: String,
}

/// A file rejected by validation or by the media store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// Result of a bulk upload with at least one success.
#[derive(Debug)]
pub struct UploadOutcome {
    pub product: Product,
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<FailedUpload>,
}

fn parse_product_id(raw: &str) -> ServiceResult<i32> {
    parse_id(raw, "productId").map_err(|err| ServiceError::Form(err.to_string()))
}

/// Uploads `files` and appends them to the product's image list.
///
/// Per-file problems are collected into `failed`; only a call where nothing succeeds is an error.
pub async fn upload_product_images<R, M>(
    repo: &R,
    media: &M,
    limiter: &RateLimiter,
    client_ip: &str,
    user: &AuthenticatedUser,
    product_id: &str,
    files: Vec<ImageFile>,
) -> ServiceResult<UploadOutcome>
where
    R: ProductReader + ProductWriter + ?Sized,
    M: MediaStore + ?Sized,
{
    if !user.can_manage_catalog() {
        return Err(ServiceError::forbidden("Only admins and managers may upload images"));
    }

    let product_id = parse_product_id(product_id)?;

    if files.is_empty() {
        return Err(ServiceError::form("No images were provided"));
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(ServiceError::form(format!(
            "At most {MAX_FILES_PER_UPLOAD} images may be uploaded at once"
        )));
    }

    limiter
        .check(client_ip, files.len() as u32)
        .map_err(|err| ServiceError::RateLimited(format!("Too many uploads: {err}")))?;

    let product = repo
        .get_product_by_id(product_id)?
        .ok_or_else(|| ServiceError::not_found("Product not found"))?;

    let limit = max_file_bytes(user);
    let mut capacity = MAX_PRODUCT_IMAGES.saturating_sub(product.images.len());
    let mut uploaded = Vec::new();
    let mut failed = Vec::new();

    for file in files {
        if let Err(err) = file.validate(limit) {
            log::warn!("Rejected upload `{}` for product {product_id}: {err}", file.file_name);
            failed.push(FailedUpload {
                file_name: file.file_name,
                error: err.to_string(),
            });
            continue;
        }

        if capacity == 0 {
            failed.push(FailedUpload {
                file_name: file.file_name,
                error: format!("product already holds {MAX_PRODUCT_IMAGES} images"),
            });
            continue;
        }

        match media.upload(&file).await {
            Ok(stored) => {
                capacity -= 1;
                uploaded.push(UploadedImage {
                    file_name: file.file_name,
                    url: stored.url,
                    public_id: stored.public_id,
                });
            }
            Err(err) => {
                log::error!("Media upload of `{}` failed: {err}", file.file_name);
                failed.push(FailedUpload {
                    file_name: file.file_name,
                    error: "upload to media store failed".to_string(),
                });
            }
        }
    }

    if uploaded.is_empty() {
        return Err(ServiceError::NothingUploaded(failed));
    }

    let images: Vec<ProductImage> = uploaded
        .iter()
        .map(|image| ProductImage {
            url: image.url.clone(),
            public_id: image.public_id.clone(),
            alt: product.name.clone(),
        })
        .collect();

    match repo.append_product_images(product_id, &images, &user.sub) {
        Ok(product) => {
            log::info!(
                "Attached {} image(s) to product {product_id}, {} rejected",
                uploaded.len(),
                failed.len()
            );
            Ok(UploadOutcome {
                product,
                uploaded,
                failed,
            })
        }
        Err(err) => {
            log::error!("Saving images of product {product_id} failed, removing uploads: {err}");
            for image in &uploaded {
                if let Err(cleanup) = media.delete(&image.public_id).await {
                    log::error!("Failed to remove orphaned asset {}: {cleanup}", image.public_id);
                }
            }
            Err(err.into())
        }
    }
}

/// Removes one image from the media store and from the product. Admins only.
pub async fn delete_product_image<R, M>(
    repo: &R,
    media: &M,
    user: &AuthenticatedUser,
    product_id: &str,
    public_id: &str,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + ?Sized,
    M: MediaStore + ?Sized,
{
    if !user.is_admin() {
        return Err(ServiceError::forbidden("Only admins may delete images"));
    }

    let product_id = parse_product_id(product_id)?;
    let public_id = parse_public_id(public_id).map_err(|err| ServiceError::Form(err.to_string()))?;

    let product = repo
        .get_product_by_id(product_id)?
        .ok_or_else(|| ServiceError::not_found("Product not found"))?;

    if !product.images.iter().any(|image| image.public_id == public_id) {
        return Err(ServiceError::not_found("Image not found on this product"));
    }

    media.delete(&public_id).await?;

    let product = repo.remove_product_image(product_id, &public_id, &user.sub)?;
    log::info!("Image {public_id} removed from product {product_id} by {}", user.sub);
    Ok(product)
}

/// Deletes a product after removing its remote images. Cleanup failures are only logged.
pub async fn delete_product<R, M>(
    repo: &R,
    media: &M,
    user: &AuthenticatedUser,
    product_id: &str,
) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter + ?Sized,
    M: MediaStore + ?Sized,
{
    if !user.is_admin() {
        return Err(ServiceError::forbidden("Only admins may delete products"));
    }

    let product_id = parse_product_id(product_id)?;
    let product = repo
        .get_product_by_id(product_id)?
        .ok_or_else(|| ServiceError::not_found("Product not found"))?;

    for image in &product.images {
        if let Err(err) = media.delete(&image.public_id).await {
            log::warn!(
                "Could not delete asset {} of product {product_id}: {err}",
                image.public_id
            );
        }
    }

    repo.delete_product(product_id)?;
    log::info!("Product {product_id} deleted by {}", user.sub);
    Ok(())
}
