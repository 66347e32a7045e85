use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::{count_star, sql};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Numeric};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::menu::MenuItem;
use crate::domain::order::{
    LineItem, NewOrder, Order, OrderChanges, OrderStatus, PopulatedLineItem, PopulatedOrder,
};
use crate::domain::ports::OrderRepository;
use crate::domain::report::{DateWindow, SalesReport};
use crate::schema::{menu_items, order_items, orders};

use super::models::{
    MenuItemRow, NewOrderItemRow, NewOrderRow, OrderChangeset, OrderItemRow, OrderRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row loading ──────────────────────────────────────────────────────────────

fn insert_items(conn: &mut PgConnection, order_id: Uuid, items: &[LineItem]) -> QueryResult<()> {
    let rows = NewOrderItemRow::for_order(order_id, items);
    if !rows.is_empty() {
        diesel::insert_into(order_items::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

/// Attaches line items, in position order, to each order row.
fn load_orders(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load::<OrderItemRow>(conn)?;
    let grouped = items.grouped_by(&rows);

    rows.into_iter()
        .zip(grouped)
        .map(|(row, items)| row.into_order(items.into_iter().map(LineItem::from).collect()))
        .collect()
}

/// Like [`load_orders`], with each line item joined to its menu item.
fn load_populated(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<PopulatedOrder>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .left_join(menu_items::table)
        .select((OrderItemRow::as_select(), Option::<MenuItemRow>::as_select()))
        .order(order_items::position.asc())
        .load::<(OrderItemRow, Option<MenuItemRow>)>(conn)?;
    let grouped = items.grouped_by(&rows);

    rows.into_iter()
        .zip(grouped)
        .map(|(row, items)| -> Result<PopulatedOrder, DomainError> {
            let order = row.into_order(Vec::new())?;
            Ok(PopulatedOrder {
                id: order.id,
                name: order.name,
                address: order.address,
                phone: order.phone,
                items: items
                    .into_iter()
                    .map(|(li, menu_item)| PopulatedLineItem {
                        menu_item: menu_item.map(MenuItem::from),
                        quantity: li.quantity,
                    })
                    .collect(),
                status: order.status,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
        })
        .collect()
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let now = Utc::now();
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    name: order.name,
                    address: order.address,
                    phone: order.phone,
                    status: order.status.to_string(),
                    created_at: now,
                    updated_at: now,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            insert_items(conn, row.id, &order.items)?;

            row.into_order(order.items)
        })
    }

    fn find_all(&self) -> Result<Vec<PopulatedOrder>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order((orders::created_at.asc(), orders::id.asc()))
            .load(&mut conn)?;

        load_populated(&mut conn, rows)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedOrder>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(load_populated(&mut conn, vec![order])?.pop())
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let changeset = OrderChangeset {
                name: changes.name,
                address: changes.address,
                phone: changes.phone,
                status: changes.status.map(|s| s.to_string()),
                updated_at: Utc::now(),
            };
            let row = diesel::update(orders::table.find(id))
                .set(&changeset)
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            let Some(row) = row else {
                return Ok(None);
            };

            if let Some(items) = &changes.items {
                diesel::delete(order_items::table.filter(order_items::order_id.eq(id)))
                    .execute(conn)?;
                insert_items(conn, id, items)?;
            }

            Ok(load_orders(conn, vec![row])?.pop())
        })
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;

        // Line items go with the order through ON DELETE CASCADE.
        let deleted = diesel::delete(orders::table.find(id))
            .returning(orders::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(deleted)
    }

    fn find_by_status(
        &self,
        status: OrderStatus,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DomainError> {
        let Some((after, before)) = window.limits() else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .filter(orders::status.eq(status.as_str()))
            .select(OrderRow::as_select())
            .order((orders::created_at.asc(), orders::id.asc()))
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(orders::created_at.gt(after));
        }
        if let Some(before) = before {
            query = query.filter(orders::created_at.lt(before));
        }

        let rows = query.load::<OrderRow>(&mut conn)?;
        load_orders(&mut conn, rows)
    }

    fn total_sales(&self, window: &DateWindow) -> Result<Option<SalesReport>, DomainError> {
        let Some((after, before)) = window.limits() else {
            return Ok(None);
        };
        let mut conn = self.pool.get()?;

        // One row per line item; the left join leaves price NULL for menu items
        // that no longer exist, which SUM skips.
        let mut query = order_items::table
            .inner_join(orders::table)
            .left_join(menu_items::table)
            .select((
                count_star(),
                sql::<Nullable<Numeric>>("SUM(menu_items.price * order_items.quantity)"),
            ))
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(orders::created_at.gt(after));
        }
        if let Some(before) = before {
            query = query.filter(orders::created_at.lt(before));
        }

        let (total_items, total) = query.get_result::<(i64, Option<BigDecimal>)>(&mut conn)?;
        if total_items == 0 {
            return Ok(None);
        }

        Ok(Some(SalesReport {
            total_items,
            total: total.unwrap_or_else(|| BigDecimal::from(0)),
        }))
    }
}
