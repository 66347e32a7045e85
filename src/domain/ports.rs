use std::sync::Arc;

use uuid::Uuid;

use super::errors::DomainError;
use super::menu::{MenuItem, MenuItemChanges, NewMenuItem};
use super::order::{NewOrder, Order, OrderChanges, OrderStatus, PopulatedOrder};
use super::report::{DateWindow, SalesReport};

/// Storage gateway for orders.
///
/// Lookups by id return `Ok(None)` for a missing order; only storage
/// failures are errors.
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    /// Every order with its line items resolved to menu items.
    fn find_all(&self) -> Result<Vec<PopulatedOrder>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedOrder>, DomainError>;
    /// Applies `changes` and refreshes `updated_at`. Returns the order as it is
    /// after the write.
    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError>;
    /// Removes the order and its line items, returning the removed id.
    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError>;
    fn find_by_status(
        &self,
        status: OrderStatus,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DomainError>;
    /// Line items sold inside `window` and their value at current menu
    /// prices. `None` when no line item falls inside the window.
    fn total_sales(&self, window: &DateWindow) -> Result<Option<SalesReport>, DomainError>;
}

pub trait MenuRepository: Send + Sync + 'static {
    fn create(&self, item: NewMenuItem) -> Result<MenuItem, DomainError>;
    fn find_all(&self) -> Result<Vec<MenuItem>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<MenuItem>, DomainError>;
    /// Case-insensitive substring match on the item name.
    fn search(&self, query: &str) -> Result<Vec<MenuItem>, DomainError>;
    fn update(&self, id: Uuid, changes: MenuItemChanges) -> Result<Option<MenuItem>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError>;
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).create(order)
    }

    fn find_all(&self) -> Result<Vec<PopulatedOrder>, DomainError> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedOrder>, DomainError> {
        (**self).find_by_id(id)
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError> {
        (**self).update(id, changes)
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        (**self).delete(id)
    }

    fn find_by_status(
        &self,
        status: OrderStatus,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DomainError> {
        (**self).find_by_status(status, window)
    }

    fn total_sales(&self, window: &DateWindow) -> Result<Option<SalesReport>, DomainError> {
        (**self).total_sales(window)
    }
}

impl<T: MenuRepository + ?Sized> MenuRepository for Arc<T> {
    fn create(&self, item: NewMenuItem) -> Result<MenuItem, DomainError> {
        (**self).create(item)
    }

    fn find_all(&self) -> Result<Vec<MenuItem>, DomainError> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<MenuItem>, DomainError> {
        (**self).find_by_id(id)
    }

    fn search(&self, query: &str) -> Result<Vec<MenuItem>, DomainError> {
        (**self).search(query)
    }

    fn update(&self, id: Uuid, changes: MenuItemChanges) -> Result<Option<MenuItem>, DomainError> {
        (**self).update(id, changes)
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        (**self).delete(id)
    }
}
