pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::{MenuRepository, OrderRepository};
use crate::handlers::ApiDoc;
use crate::infrastructure::{DieselMenuRepository, DieselOrderRepository, InMemoryStore};

pub use application::{MenuService, OrderService, SharedMenuService, SharedOrderService};
pub use config::Config;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Services shared by every worker of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    orders: web::Data<SharedOrderService>,
    menu: web::Data<SharedMenuService>,
}

impl AppState {
    pub fn new(orders: Arc<dyn OrderRepository>, menu: Arc<dyn MenuRepository>) -> Self {
        Self {
            orders: web::Data::new(OrderService::new(orders)),
            menu: web::Data::new(MenuService::new(menu)),
        }
    }

    /// Postgres-backed storage.
    pub fn postgres(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselMenuRepository::new(pool)),
        )
    }

    /// Process-local storage; data is lost on restart.
    pub fn from_store(store: InMemoryStore) -> Self {
        Self::new(Arc::new(store.clone()), Arc::new(store))
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.orders.clone())
            .app_data(self.menu.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::path_config());
        handlers::routes(cfg);
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
