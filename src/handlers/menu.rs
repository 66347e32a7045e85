use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{blocking, DeletedResponse};
use crate::application::SharedMenuService;
use crate::domain::menu::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: Option<String>,
}

impl From<CreateMenuItemRequest> for MenuItemDraft {
    fn from(req: CreateMenuItemRequest) -> Self {
        MenuItemDraft {
            name: req.name,
            description: req.description,
            price: req.price,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    /// Omit to keep the description, send `null` to clear it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<String>,
}

/// Marks a field that was sent, even as `null`, so it can be told apart
/// from one that was left out.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<UpdateMenuItemRequest> for MenuItemPatch {
    fn from(req: UpdateMenuItemRequest) -> Self {
        MenuItemPatch {
            name: req.name,
            description: req.description,
            price: req.price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        MenuItemResponse {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price.to_string(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive fragment of the item name. Empty lists everything.
    pub q: Option<String>,
}

fn to_responses(items: Vec<MenuItem>) -> Vec<MenuItemResponse> {
    items.into_iter().map(MenuItemResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /menu/search
#[utoipa::path(
    get,
    path = "/menu/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching menu items", body = Vec<MenuItemResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn search_menu(
    service: web::Data<SharedMenuService>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner().q;
    let items = blocking(move || service.search(q.as_deref())).await?;
    Ok(HttpResponse::Ok().json(to_responses(items)))
}

/// GET /menu/{id}
#[utoipa::path(
    get,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    responses(
        (status = 200, description = "Menu item found", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn get_menu_item(
    service: web::Data<SharedMenuService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match blocking(move || service.get_one(id)).await? {
        Some(item) => Ok(HttpResponse::Ok().json(MenuItemResponse::from(item))),
        None => Err(AppError::NotFound),
    }
}

/// GET /menu
#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "The whole menu, by name", body = Vec<MenuItemResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn list_menu(service: web::Data<SharedMenuService>) -> Result<HttpResponse, AppError> {
    let items = blocking(move || service.get_all()).await?;
    Ok(HttpResponse::Ok().json(to_responses(items)))
}

/// POST /menu
#[utoipa::path(
    post,
    path = "/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItemResponse),
        (status = 400, description = "Missing name or invalid price"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn create_menu_item(
    service: web::Data<SharedMenuService>,
    body: web::Json<CreateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = MenuItemDraft::from(body.into_inner());
    let item = blocking(move || service.create(draft)).await?;
    Ok(HttpResponse::Created().json(MenuItemResponse::from(item)))
}

/// PUT /menu/{id}
#[utoipa::path(
    put,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item after the update", body = MenuItemResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn update_menu_item(
    service: web::Data<SharedMenuService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = MenuItemPatch::from(body.into_inner());
    match blocking(move || service.update(id, patch)).await? {
        Some(item) => Ok(HttpResponse::Ok().json(MenuItemResponse::from(item))),
        None => Err(AppError::NotFound),
    }
}

/// DELETE /menu/{id}
///
/// Orders that reference the item keep the reference; it resolves to `null`.
#[utoipa::path(
    delete,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    responses(
        (status = 200, description = "Menu item deleted", body = DeletedResponse),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn delete_menu_item(
    service: web::Data<SharedMenuService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let id = blocking(move || service.remove(id)).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id }))
}
