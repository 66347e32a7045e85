use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    NewOrder, Order, OrderChanges, OrderDraft, OrderPatch, OrderStatus, PopulatedOrder,
};
use crate::domain::ports::OrderRepository;
use crate::domain::report::{DateWindow, SalesReport};

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_all(&self) -> Result<Vec<PopulatedOrder>, DomainError> {
        self.repo.find_all()
    }

    pub fn get_one(&self, id: Uuid) -> Result<Option<PopulatedOrder>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn create(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let order = NewOrder::try_from(draft)?;
        let created = self.repo.create(order)?;
        log::info!(
            "Created order {} with {} item(s)",
            created.id,
            created.items.len()
        );
        Ok(created)
    }

    pub fn update(&self, id: Uuid, patch: OrderPatch) -> Result<Option<Order>, DomainError> {
        let changes = OrderChanges::try_from(patch)?;
        self.repo.update(id, changes)
    }

    pub fn remove(&self, id: Uuid) -> Result<Uuid, DomainError> {
        match self.repo.delete(id)? {
            Some(deleted) => {
                log::info!("Deleted order {}", deleted);
                Ok(deleted)
            }
            None => Err(DomainError::NotFound),
        }
    }

    pub fn get_by_status(
        &self,
        status: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Order>, DomainError> {
        let status: OrderStatus = status.parse()?;
        let window = report_window(start, end);
        self.repo.find_by_status(status, &window)
    }

    pub fn get_total_sales(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<SalesReport>, DomainError> {
        let window = report_window(start, end);
        self.repo.total_sales(&window)
    }
}

fn report_window(start: Option<&str>, end: Option<&str>) -> DateWindow {
    let window = DateWindow::parse(start, end);
    if !window.is_satisfiable() {
        log::warn!(
            "Unreadable report date bound (start={:?}, end={:?}); no order can match",
            start,
            end
        );
    }
    window
}
