//! In-process storage backing both repository ports.
//!
//! Clones share state, so one store can be handed to the order and the menu
//! service alike and line items resolve against the same menu.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, MenuItemChanges, NewMenuItem};
use crate::domain::order::{NewOrder, Order, OrderChanges, OrderStatus, PopulatedOrder};
use crate::domain::ports::{MenuRepository, OrderRepository};
use crate::domain::report::{DateWindow, SalesReport};

#[derive(Debug, Default)]
struct State {
    menu_items: Vec<MenuItem>,
    /// Kept in insertion order, which is also `created_at` order.
    orders: Vec<Order>,
}

impl State {
    fn menu_item(&self, id: Uuid) -> Option<&MenuItem> {
        self.menu_items.iter().find(|m| m.id == id)
    }

    fn populate(&self, order: &Order) -> PopulatedOrder {
        PopulatedOrder::from_order(order.clone(), |id| self.menu_item(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DomainError> {
        self.state
            .read()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DomainError> {
        self.state
            .write()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            name: order.name,
            address: order.address,
            phone: order.phone,
            items: order.items,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        self.write()?.orders.push(created.clone());
        Ok(created)
    }

    fn find_all(&self) -> Result<Vec<PopulatedOrder>, DomainError> {
        let state = self.read()?;
        Ok(state.orders.iter().map(|o| state.populate(o)).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedOrder>, DomainError> {
        let state = self.read()?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| state.populate(o)))
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError> {
        let mut state = self.write()?;
        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            order.name = name;
        }
        if let Some(address) = changes.address {
            order.address = address;
        }
        if let Some(phone) = changes.phone {
            order.phone = phone;
        }
        if let Some(items) = changes.items {
            order.items = items;
        }
        if let Some(status) = changes.status {
            order.status = status;
        }
        order.updated_at = Utc::now();

        Ok(Some(order.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let mut state = self.write()?;
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        Ok((state.orders.len() != before).then_some(id))
    }

    fn find_by_status(
        &self,
        status: OrderStatus,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .read()?
            .orders
            .iter()
            .filter(|o| o.status == status && window.contains(o.created_at))
            .cloned()
            .collect())
    }

    fn total_sales(&self, window: &DateWindow) -> Result<Option<SalesReport>, DomainError> {
        let state = self.read()?;
        let rows: Vec<_> = state
            .orders
            .iter()
            .filter(|o| window.contains(o.created_at))
            .flat_map(|o| o.items.iter())
            .collect();

        if rows.is_empty() {
            return Ok(None);
        }

        // Line items whose menu item is gone still count, but add no value.
        let total = rows
            .iter()
            .filter_map(|li| {
                state
                    .menu_item(li.menu_item_id)
                    .map(|m| &m.price * BigDecimal::from(li.quantity))
            })
            .fold(BigDecimal::from(0), |acc, value| acc + value);

        Ok(Some(SalesReport {
            total_items: rows.len() as i64,
            total,
        }))
    }
}

impl MenuRepository for InMemoryStore {
    fn create(&self, item: NewMenuItem) -> Result<MenuItem, DomainError> {
        let now = Utc::now();
        let created = MenuItem {
            id: Uuid::new_v4(),
            name: item.name,
            description: item.description,
            price: item.price,
            created_at: now,
            updated_at: now,
        };
        self.write()?.menu_items.push(created.clone());
        Ok(created)
    }

    fn find_all(&self) -> Result<Vec<MenuItem>, DomainError> {
        let mut items = self.read()?.menu_items.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.read()?.menu_item(id).cloned())
    }

    fn search(&self, query: &str) -> Result<Vec<MenuItem>, DomainError> {
        let needle = query.to_lowercase();
        Ok(MenuRepository::find_all(self)?
            .into_iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .collect())
    }

    fn update(&self, id: Uuid, changes: MenuItemChanges) -> Result<Option<MenuItem>, DomainError> {
        let mut state = self.write()?;
        let Some(item) = state.menu_items.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(description) = changes.description {
            item.description = description;
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        item.updated_at = Utc::now();

        Ok(Some(item.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let mut state = self.write()?;
        let before = state.menu_items.len();
        state.menu_items.retain(|m| m.id != id);
        Ok((state.menu_items.len() != before).then_some(id))
    }
}
