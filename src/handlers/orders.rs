use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::menu::MenuItemResponse;
use super::{blocking, DeletedResponse};
use crate::application::SharedOrderService;
use crate::domain::order::{
    LineItem, LineItemDraft, Order, OrderDraft, OrderPatch, PopulatedLineItem, PopulatedOrder,
};
use crate::domain::report::SalesReport;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct LineItemRequest {
    /// Id of the referenced menu item.
    pub item: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl From<LineItemRequest> for LineItemDraft {
    fn from(req: LineItemRequest) -> Self {
        LineItemDraft {
            menu_item_id: req.item,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
    /// One of pending, confirmed, delivered, cancelled. Defaults to pending.
    pub status: Option<String>,
}

impl From<CreateOrderRequest> for OrderDraft {
    fn from(req: CreateOrderRequest) -> Self {
        OrderDraft {
            name: req.name,
            address: req.address,
            phone: req.phone,
            items: req.items.into_iter().map(LineItemDraft::from).collect(),
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Replaces the whole item list when present.
    pub items: Option<Vec<LineItemRequest>>,
    pub status: Option<String>,
}

impl From<UpdateOrderRequest> for OrderPatch {
    fn from(req: UpdateOrderRequest) -> Self {
        OrderPatch {
            name: req.name,
            address: req.address,
            phone: req.phone,
            items: req
                .items
                .map(|items| items.into_iter().map(LineItemDraft::from).collect()),
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub item: Uuid,
    pub quantity: i32,
}

impl From<LineItem> for LineItemResponse {
    fn from(li: LineItem) -> Self {
        LineItemResponse {
            item: li.menu_item_id,
            quantity: li.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<LineItemResponse>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            name: order.name,
            address: order.address,
            phone: order.phone,
            items: order.items.into_iter().map(LineItemResponse::from).collect(),
            status: order.status.to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PopulatedLineItemResponse {
    /// `null` when the menu item has been deleted since the order was placed.
    pub item: Option<MenuItemResponse>,
    pub quantity: i32,
}

impl From<PopulatedLineItem> for PopulatedLineItemResponse {
    fn from(li: PopulatedLineItem) -> Self {
        PopulatedLineItemResponse {
            item: li.menu_item.map(MenuItemResponse::from),
            quantity: li.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PopulatedOrderResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<PopulatedLineItemResponse>,
    /// Decimal sum of price × quantity at current menu prices, as a string.
    pub total: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PopulatedOrder> for PopulatedOrderResponse {
    fn from(order: PopulatedOrder) -> Self {
        let total = order.total().to_string();
        PopulatedOrderResponse {
            total,
            id: order.id,
            name: order.name,
            address: order.address,
            phone: order.phone,
            items: order
                .items
                .into_iter()
                .map(PopulatedLineItemResponse::from)
                .collect(),
            status: order.status.to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReportResponse {
    /// Number of line items counted, regardless of their quantity.
    pub total_items: i64,
    /// Decimal sum of price × quantity, as a string.
    pub total: String,
}

impl From<SalesReport> for SalesReportResponse {
    fn from(report: SalesReport) -> Self {
        SalesReportResponse {
            total_items: report.total_items,
            total: report.total.to_string(),
        }
    }
}

/// Exclusive `created_at` bounds. Missing, empty or `undefined` means unbounded.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns every order with its menu items resolved.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders, populated", body = Vec<PopulatedOrderResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    let orders = blocking(move || service.get_all()).await?;
    let body: Vec<PopulatedOrderResponse> =
        orders.into_iter().map(PopulatedOrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = PopulatedOrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    match blocking(move || service.get_one(order_id)).await? {
        Some(order) => Ok(HttpResponse::Ok().json(PopulatedOrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// POST /orders
///
/// Line items and the order row are written in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Missing field, bad line item or unknown status"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<SharedOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = OrderDraft::from(body.into_inner());
    let order = blocking(move || service.create(draft)).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order after the update", body = OrderResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let patch = OrderPatch::from(body.into_inner());
    match blocking(move || service.update(order_id, patch)).await? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = DeletedResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let id = blocking(move || service.remove(order_id)).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id }))
}

/// GET /orders/status/{status}
///
/// Orders in the given status created strictly between `start` and `end`,
/// oldest first. Line items are not populated.
#[utoipa::path(
    get,
    path = "/orders/status/{status}",
    params(
        ("status" = String, Path, description = "pending, confirmed, delivered or cancelled"),
        ReportParams,
    ),
    responses(
        (status = 200, description = "Matching orders", body = Vec<OrderResponse>),
        (status = 400, description = "Unknown status"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_status(
    service: web::Data<SharedOrderService>,
    path: web::Path<String>,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    let status = path.into_inner();
    let ReportParams { start, end } = query.into_inner();
    let orders = blocking(move || {
        service.get_by_status(&status, start.as_deref(), end.as_deref())
    })
    .await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/sales
///
/// Aggregates every line item of the orders created strictly between `start`
/// and `end`. The body is `null` when no line item matches.
#[utoipa::path(
    get,
    path = "/orders/sales",
    params(ReportParams),
    responses(
        (status = 200, description = "Sales totals, or null when nothing matched", body = SalesReportResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn total_sales(
    service: web::Data<SharedOrderService>,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    let ReportParams { start, end } = query.into_inner();
    let report =
        blocking(move || service.get_total_sales(start.as_deref(), end.as_deref())).await?;
    Ok(HttpResponse::Ok().json(report.map(SalesReportResponse::from)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::infrastructure::InMemoryStore;
    use crate::AppState;

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new().configure(|cfg| AppState::from_store($store.clone()).configure(cfg)),
            )
            .await
        };
    }

    macro_rules! post_json {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($uri)
                .set_json($body)
                .to_request();
            test::call_service(&$app, req).await
        }};
    }

    fn order_body(item: &str, quantity: i32) -> Value {
        json!({
            "name": "Ada",
            "address": "12 Analytical Way",
            "phone": "555-0199",
            "items": [{ "item": item, "quantity": quantity }]
        })
    }

    #[actix_web::test]
    async fn create_order_returns_201_and_defaults_to_pending() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/menu", json!({ "name": "Pho", "price": "11" }));
        let menu: Value = test::read_body_json(resp).await;
        let menu_id = menu["id"].as_str().unwrap();

        let resp = post_json!(app, "/orders", order_body(menu_id, 2));
        assert_eq!(resp.status(), StatusCode::CREATED);
        let order: Value = test::read_body_json(resp).await;
        assert_eq!(order["status"], "pending");
        assert_eq!(order["items"][0]["item"], menu_id);
        assert_eq!(order["items"][0]["quantity"], 2);
    }

    #[actix_web::test]
    async fn get_order_populates_menu_items() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/menu", json!({ "name": "Pho", "price": "11" }));
        let menu: Value = test::read_body_json(resp).await;
        let resp = post_json!(app, "/orders", order_body(menu["id"].as_str().unwrap(), 1));
        let order: Value = test::read_body_json(resp).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", order["id"].as_str().unwrap()))
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["items"][0]["item"]["name"], "Pho");
        assert_eq!(found["items"][0]["item"]["price"], "11");
    }

    #[actix_web::test]
    async fn populated_order_carries_its_total() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/menu", json!({ "name": "Pho", "price": "11" }));
        let pho: Value = test::read_body_json(resp).await;
        let resp = post_json!(app, "/menu", json!({ "name": "Tea", "price": "2" }));
        let tea: Value = test::read_body_json(resp).await;

        let resp = post_json!(
            app,
            "/orders",
            json!({
                "name": "Ada",
                "address": "12 Analytical Way",
                "phone": "555-0199",
                "items": [
                    { "item": pho["id"], "quantity": 2 },
                    { "item": tea["id"], "quantity": 3 },
                    { "item": uuid::Uuid::new_v4(), "quantity": 5 }
                ]
            })
        );
        let order: Value = test::read_body_json(resp).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", order["id"].as_str().unwrap()))
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["total"], "28");

        let req = test::TestRequest::get().uri("/orders").to_request();
        let all: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all[0]["total"], "28");
    }

    #[actix_web::test]
    async fn deleted_menu_item_resolves_to_null() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/menu", json!({ "name": "Pho", "price": "11" }));
        let menu: Value = test::read_body_json(resp).await;
        let menu_id = menu["id"].as_str().unwrap().to_string();
        let resp = post_json!(app, "/orders", order_body(&menu_id, 1));
        let order: Value = test::read_body_json(resp).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/menu/{menu_id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", order["id"].as_str().unwrap()))
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert!(found["items"][0]["item"].is_null());
        assert_eq!(found["items"][0]["quantity"], 1);
    }

    #[actix_web::test]
    async fn create_with_invalid_status_is_400() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let mut body = order_body(&uuid::Uuid::new_v4().to_string(), 1);
        body["status"] = json!("shipped");
        let resp = post_json!(app, "/orders", body);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].as_str().unwrap().contains("shipped"));
    }

    #[actix_web::test]
    async fn create_without_phone_is_400() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let mut body = order_body(&uuid::Uuid::new_v4().to_string(), 1);
        body.as_object_mut().unwrap().remove("phone");
        let resp = post_json!(app, "/orders", body);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_json_is_400() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].is_string());
    }

    #[actix_web::test]
    async fn unknown_order_is_404() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["error"], "Not found");

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", uuid::Uuid::new_v4()))
            .set_json(json!({ "status": "confirmed" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn malformed_id_is_a_json_404() {
        let store = InMemoryStore::new();
        let app = app!(store);

        for req in [
            test::TestRequest::get().uri("/orders/abc").to_request(),
            test::TestRequest::delete().uri("/orders/abc").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let err: Value = test::read_body_json(resp).await;
            assert_eq!(err["error"], "Not found");
        }
    }

    #[actix_web::test]
    async fn delete_twice_is_404_the_second_time() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/orders", order_body(&uuid::Uuid::new_v4().to_string(), 1));
        let order: Value = test::read_body_json(resp).await;
        let uri = format!("/orders/{}", order["id"].as_str().unwrap());

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let deleted: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted["id"], order["id"]);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn update_sets_status_and_keeps_items() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let item = uuid::Uuid::new_v4().to_string();
        let resp = post_json!(app, "/orders", order_body(&item, 3));
        let order: Value = test::read_body_json(resp).await;

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", order["id"].as_str().unwrap()))
            .set_json(json!({ "status": "delivered" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "delivered");
        assert_eq!(updated["items"][0]["item"], item.as_str());
        assert_eq!(updated["items"][0]["quantity"], 3);
    }

    #[actix_web::test]
    async fn status_route_filters_and_rejects_unknown_status() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let item = uuid::Uuid::new_v4().to_string();
        post_json!(app, "/orders", order_body(&item, 1));
        let mut confirmed = order_body(&item, 1);
        confirmed["status"] = json!("confirmed");
        post_json!(app, "/orders", confirmed);

        let req = test::TestRequest::get()
            .uri("/orders/status/confirmed?start=undefined&end=")
            .to_request();
        let found: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["status"], "confirmed");

        let req = test::TestRequest::get()
            .uri("/orders/status/lost")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn sales_is_null_without_orders() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let req = test::TestRequest::get().uri("/orders/sales").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body.is_null());
    }

    #[actix_web::test]
    async fn sales_sums_price_times_quantity() {
        let store = InMemoryStore::new();
        let app = app!(store);

        let resp = post_json!(app, "/menu", json!({ "name": "Soup", "price": "5" }));
        let soup: Value = test::read_body_json(resp).await;
        let resp = post_json!(app, "/menu", json!({ "name": "Pie", "price": "10" }));
        let pie: Value = test::read_body_json(resp).await;

        post_json!(
            app,
            "/orders",
            json!({
                "name": "Ada",
                "address": "12 Analytical Way",
                "phone": "555-0199",
                "items": [
                    { "item": soup["id"], "quantity": 3 },
                    { "item": pie["id"], "quantity": 1 }
                ]
            })
        );

        let req = test::TestRequest::get().uri("/orders/sales").to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["total_items"], 2);
        assert_eq!(report["total"], "25");
    }
}
