pub mod memory;
pub mod menu_repo;
pub mod models;
pub mod order_repo;

#[cfg(test)]
pub(crate) mod test_support;

pub use memory::InMemoryStore;
pub use menu_repo::DieselMenuRepository;
pub use order_repo::DieselOrderRepository;
