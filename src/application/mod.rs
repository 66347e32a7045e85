pub mod menu_service;
pub mod order_service;

use std::sync::Arc;

use crate::domain::ports::{MenuRepository, OrderRepository};

pub use menu_service::MenuService;
pub use order_service::OrderService;

/// Services as the HTTP layer holds them, with the storage engine erased.
pub type SharedOrderService = OrderService<Arc<dyn OrderRepository>>;
pub type SharedMenuService = MenuService<Arc<dyn MenuRepository>>;
