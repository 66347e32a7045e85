use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, MenuItemChanges, MenuItemDraft, MenuItemPatch, NewMenuItem};
use crate::domain::ports::MenuRepository;

pub struct MenuService<M> {
    repo: M,
}

impl<M: MenuRepository> MenuService<M> {
    pub fn new(repo: M) -> Self {
        Self { repo }
    }

    pub fn get_all(&self) -> Result<Vec<MenuItem>, DomainError> {
        self.repo.find_all()
    }

    pub fn get_one(&self, id: Uuid) -> Result<Option<MenuItem>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// A blank query lists the whole menu.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        match query.map(str::trim) {
            Some(q) if !q.is_empty() => self.repo.search(q),
            _ => self.repo.find_all(),
        }
    }

    pub fn create(&self, draft: MenuItemDraft) -> Result<MenuItem, DomainError> {
        let item = NewMenuItem::try_from(draft)?;
        let created = self.repo.create(item)?;
        log::info!("Created menu item {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn update(&self, id: Uuid, patch: MenuItemPatch) -> Result<Option<MenuItem>, DomainError> {
        let changes = MenuItemChanges::try_from(patch)?;
        self.repo.update(id, changes)
    }

    pub fn remove(&self, id: Uuid) -> Result<Uuid, DomainError> {
        let deleted = self.repo.delete(id)?.ok_or(DomainError::NotFound)?;
        log::info!("Deleted menu item {}", deleted);
        Ok(deleted)
    }
}
