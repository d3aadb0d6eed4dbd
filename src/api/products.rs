use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{NewProduct, ProductUpdate};

use super::{ApiError, AppState, MessageBody, types::ProductDto};

#[derive(Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStockRequest {
    pub stock: i32,
}

#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
    category_id: Option<i32>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Invalid image upload: {e}")))?;
            if !bytes.is_empty() {
                form.image = Some((filename, bytes.to_vec()));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid field {name}: {e}")))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "price" => form.price = value.parse().ok(),
            "stock" => form.stock = value.parse().ok(),
            "category_id" => form.category_id = value.parse().ok(),
            _ => {}
        }
    }

    Ok(form)
}

/// GET /products?search=
/// Substring search over product and category names.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let rows = state.store().list_products(query.search.as_deref()).await?;
    Ok(Json(
        rows.into_iter()
            .map(|(product, category)| ProductDto::from_row(product, category))
            .collect(),
    ))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let (product, category) = state
        .store()
        .get_product_with_category(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(ProductDto::from_row(product, category)))
}

/// POST /products (multipart)
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let form = read_product_form(multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Name is required."))?;
    let price = form
        .price
        .ok_or_else(|| ApiError::validation("Price is required."))?;
    let stock = form
        .stock
        .ok_or_else(|| ApiError::validation("Stock is required."))?;
    let category_id = form
        .category_id
        .ok_or_else(|| ApiError::validation("Category is required."))?;

    if price < Decimal::ZERO {
        return Err(ApiError::validation("Price cannot be negative."));
    }
    if stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative."));
    }

    if state.store().get_category(category_id).await?.is_none() {
        return Err(ApiError::validation("Selected category does not exist."));
    }

    let image_url = match form.image {
        Some((filename, bytes)) => state.uploads.save_image(&filename, &bytes).await?,
        None => state.uploads.default_product_image(),
    };

    let product = state
        .store()
        .create_product(NewProduct {
            name,
            description: form.description.unwrap_or_default(),
            price,
            stock,
            image_url: Some(image_url),
            category_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductDto::from_row(product, None))))
}

/// PUT /products/{id} (multipart)
/// Updates product fields; the stored image only changes when a new one is
/// uploaded.
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<MessageBody>, ApiError> {
    let form = read_product_form(multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Name is required."))?;
    let price = form
        .price
        .ok_or_else(|| ApiError::validation("Price is required."))?;
    let stock = form
        .stock
        .ok_or_else(|| ApiError::validation("Stock is required."))?;
    let category_id = form
        .category_id
        .ok_or_else(|| ApiError::validation("Category is required."))?;

    if price < Decimal::ZERO {
        return Err(ApiError::validation("Price cannot be negative."));
    }
    if stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative."));
    }

    let image_url = match form.image {
        Some((filename, bytes)) => Some(state.uploads.save_image(&filename, &bytes).await?),
        None => None,
    };

    let updated = state
        .store()
        .update_product(
            &id,
            ProductUpdate {
                name,
                description: form.description.unwrap_or_default(),
                price,
                stock,
                image_url,
                category_id,
            },
        )
        .await?;
    if !updated {
        return Err(ApiError::not_found("Product", &id));
    }

    Ok(Json(MessageBody {
        message: "Product updated.".to_string(),
    }))
}

/// PUT /products/{id}/stock
/// Absolute stock overwrite.
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStockRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    if payload.stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative."));
    }

    let updated = state.store().update_product_stock(&id, payload.stock).await?;
    if !updated {
        return Err(ApiError::not_found("Product", &id));
    }

    Ok(Json(MessageBody {
        message: "Stock updated.".to_string(),
    }))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_product(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Product", &id));
    }

    Ok(Json(MessageBody {
        message: "Product deleted.".to_string(),
    }))
}
