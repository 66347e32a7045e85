use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, MenuItemChanges, NewMenuItem};
use crate::domain::ports::MenuRepository;
use crate::schema::menu_items;

use super::models::{MenuItemChangeset, MenuItemRow, NewMenuItemRow};

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub struct DieselMenuRepository {
    pool: DbPool,
}

impl DieselMenuRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MenuRepository for DieselMenuRepository {
    fn create(&self, item: NewMenuItem) -> Result<MenuItem, DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();

        let row = diesel::insert_into(menu_items::table)
            .values(&NewMenuItemRow {
                id: Uuid::new_v4(),
                name: item.name,
                description: item.description,
                price: item.price,
                created_at: now,
                updated_at: now,
            })
            .returning(MenuItemRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn find_all(&self) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = menu_items::table
            .select(MenuItemRow::as_select())
            .order((menu_items::name.asc(), menu_items::id.asc()))
            .load::<MenuItemRow>(&mut conn)?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = menu_items::table
            .find(id)
            .select(MenuItemRow::as_select())
            .first::<MenuItemRow>(&mut conn)
            .optional()?;

        Ok(row.map(MenuItem::from))
    }

    fn search(&self, query: &str) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = menu_items::table
            .filter(menu_items::name.ilike(like_pattern(query)))
            .select(MenuItemRow::as_select())
            .order((menu_items::name.asc(), menu_items::id.asc()))
            .load::<MenuItemRow>(&mut conn)?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    fn update(&self, id: Uuid, changes: MenuItemChanges) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(menu_items::table.find(id))
            .set(&MenuItemChangeset {
                name: changes.name,
                description: changes.description,
                price: changes.price,
                updated_at: Utc::now(),
            })
            .returning(MenuItemRow::as_returning())
            .get_result::<MenuItemRow>(&mut conn)
            .optional()?;

        Ok(row.map(MenuItem::from))
    }

    fn delete(&self, id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(menu_items::table.find(id))
            .returning(menu_items::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::{like_pattern, DieselMenuRepository};
    use crate::domain::menu::{MenuItemChanges, NewMenuItem};
    use crate::domain::ports::MenuRepository;
    use crate::infrastructure::test_support::setup_db;

    fn item(name: &str, price: &str) -> NewMenuItem {
        NewMenuItem {
            name: name.to_string(),
            description: Some("house special".to_string()),
            price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tea"), "%tea%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn create_find_update_delete() {
        let (_container, pool) = setup_db().await;
        let repo = DieselMenuRepository::new(pool);

        let created = repo.create(item("Pho", "11.25")).expect("create failed");
        let found = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("item should exist");
        assert_eq!(found.name, "Pho");
        assert_eq!(found.price, BigDecimal::from_str("11.25").unwrap());

        let updated = repo
            .update(
                created.id,
                MenuItemChanges {
                    price: Some(BigDecimal::from(12)),
                    ..Default::default()
                },
            )
            .expect("update failed")
            .expect("item should exist");
        assert_eq!(updated.name, "Pho");
        assert_eq!(updated.price, BigDecimal::from(12));
        assert_eq!(updated.description.as_deref(), Some("house special"));

        let cleared = repo
            .update(
                created.id,
                MenuItemChanges {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .expect("update failed")
            .expect("item should exist");
        assert!(cleared.description.is_none());

        assert_eq!(repo.delete(created.id).expect("delete failed"), Some(created.id));
        assert!(repo.find_by_id(created.id).expect("find failed").is_none());
        assert_eq!(repo.delete(Uuid::new_v4()).expect("delete failed"), None);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn search_matches_name_case_insensitively() {
        let (_container, pool) = setup_db().await;
        let repo = DieselMenuRepository::new(pool);
        for (name, price) in [("Green Tea", "3"), ("Coffee", "4"), ("Iced tea", "3.5")] {
            repo.create(item(name, price)).expect("create failed");
        }

        let names: Vec<_> = repo
            .search("TEA")
            .expect("search failed")
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Green Tea", "Iced tea"]);

        assert!(repo.search("%").expect("search failed").is_empty());
        assert_eq!(repo.find_all().expect("find_all failed").len(), 3);
    }
}
