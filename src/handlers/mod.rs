pub mod health;
pub mod menu;
pub mod orders;

use actix_web::web;
use utoipa::OpenApi;

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Runs a blocking service call on actix's thread pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// Malformed JSON bodies are reported as 400 with the usual error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Path segments that fail to parse (e.g. a malformed id) answer 404 with
/// the usual error shape.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected path: {}", err);
        AppError::NotFound.into()
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .service(
            web::scope("/menu")
                .route("/search", web::get().to(menu::search_menu))
                .route("/{id}", web::get().to(menu::get_menu_item))
                .route("", web::get().to(menu::list_menu))
                .route("", web::post().to(menu::create_menu_item))
                .route("/{id}", web::put().to(menu::update_menu_item))
                .route("/{id}", web::delete().to(menu::delete_menu_item)),
        )
        .service(
            web::scope("/orders")
                .route("/sales", web::get().to(orders::total_sales))
                .route("/status/{status}", web::get().to(orders::list_orders_by_status))
                .route("/{id}", web::get().to(orders::get_order))
                .route("", web::get().to(orders::list_orders))
                .route("", web::post().to(orders::create_order))
                .route("/{id}", web::put().to(orders::update_order))
                .route("/{id}", web::delete().to(orders::delete_order)),
        );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        menu::search_menu,
        menu::get_menu_item,
        menu::list_menu,
        menu::create_menu_item,
        menu::update_menu_item,
        menu::delete_menu_item,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        orders::list_orders_by_status,
        orders::total_sales,
    ),
    components(schemas(
        menu::CreateMenuItemRequest,
        menu::UpdateMenuItemRequest,
        menu::MenuItemResponse,
        orders::LineItemRequest,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::LineItemResponse,
        orders::OrderResponse,
        orders::PopulatedLineItemResponse,
        orders::PopulatedOrderResponse,
        orders::SalesReportResponse,
        DeletedResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "orders", description = "Orders and sales reporting"),
        (name = "menu", description = "Menu items referenced by orders"),
    )
)]
pub struct ApiDoc;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct DeletedResponse {
    pub id: uuid::Uuid,
}
