use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{optional_text, required_text, DomainError};
use super::menu::MenuItem;

/// Lifecycle state of an order. Any state may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "`{s}` is not a valid status; expected one of pending, confirmed, delivered, cancelled"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item with its menu item reference resolved. `menu_item` is `None`
/// when the referenced item no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedLineItem {
    pub menu_item: Option<MenuItem>,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedOrder {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<PopulatedLineItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedOrder {
    /// Resolves each line item of `order` through `lookup`, keeping item order.
    pub fn from_order<F>(order: Order, mut lookup: F) -> Self
    where
        F: FnMut(Uuid) -> Option<MenuItem>,
    {
        Self {
            id: order.id,
            name: order.name,
            address: order.address,
            phone: order.phone,
            items: order
                .items
                .into_iter()
                .map(|li| PopulatedLineItem {
                    menu_item: lookup(li.menu_item_id),
                    quantity: li.quantity,
                })
                .collect(),
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }

    /// Sum of price × quantity at current menu prices. Line items whose menu
    /// item is gone add nothing.
    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .filter_map(|li| {
                li.menu_item
                    .as_ref()
                    .map(|m| &m.price * BigDecimal::from(li.quantity))
            })
            .fold(BigDecimal::from(0), |acc, value| acc + value)
    }
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LineItemDraft {
    pub menu_item_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

/// Unvalidated order as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub items: Vec<LineItemDraft>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
}

impl TryFrom<OrderDraft> for NewOrder {
    type Error = DomainError;

    fn try_from(draft: OrderDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_text("name", draft.name)?,
            address: required_text("address", draft.address)?,
            phone: required_text("phone", draft.phone)?,
            items: validate_items(draft.items)?,
            status: draft
                .status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

/// Partial replacement of an order; absent fields are left untouched and
/// `items`, when present, replaces the whole list.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub items: Option<Vec<LineItemDraft>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub status: Option<OrderStatus>,
}

impl TryFrom<OrderPatch> for OrderChanges {
    type Error = DomainError;

    fn try_from(patch: OrderPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: optional_text("name", patch.name)?,
            address: optional_text("address", patch.address)?,
            phone: optional_text("phone", patch.phone)?,
            items: patch.items.map(validate_items).transpose()?,
            status: patch.status.as_deref().map(str::parse::<OrderStatus>).transpose()?,
        })
    }
}

fn validate_items(items: Vec<LineItemDraft>) -> Result<Vec<LineItem>, DomainError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, li)| {
            let menu_item_id = li
                .menu_item_id
                .ok_or_else(|| DomainError::Validation(format!("`items[{i}].item` is required")))?;
            let quantity = li.quantity.ok_or_else(|| {
                DomainError::Validation(format!("`items[{i}].quantity` is required"))
            })?;
            if quantity < 1 {
                return Err(DomainError::Validation(format!(
                    "`items[{i}].quantity` must be at least 1, got {quantity}"
                )));
            }
            Ok(LineItem {
                menu_item_id,
                quantity,
            })
        })
        .collect()
}
