use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{optional_text, required_text, DomainError};

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated menu item as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct MenuItemDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Decimal price as text, e.g. "9.99".
    pub price: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
}

impl TryFrom<MenuItemDraft> for NewMenuItem {
    type Error = DomainError;

    fn try_from(draft: MenuItemDraft) -> Result<Self, Self::Error> {
        let price = draft
            .price
            .ok_or_else(|| DomainError::Validation("`price` is required".to_string()))?;

        Ok(Self {
            name: required_text("name", draft.name)?,
            description: draft.description,
            price: parse_price(&price)?,
        })
    }
}

/// Partial update of a menu item; absent fields are left untouched.
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MenuItemChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<BigDecimal>,
}

impl TryFrom<MenuItemPatch> for MenuItemChanges {
    type Error = DomainError;

    fn try_from(patch: MenuItemPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: optional_text("name", patch.name)?,
            description: patch.description,
            price: patch.price.as_deref().map(parse_price).transpose()?,
        })
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, DomainError> {
    let price = BigDecimal::from_str(raw.trim())
        .map_err(|e| DomainError::Validation(format!("Invalid price '{raw}': {e}")))?;
    if price < BigDecimal::from(0) {
        return Err(DomainError::Validation(format!(
            "Invalid price '{raw}': must not be negative"
        )));
    }
    Ok(price)
}
