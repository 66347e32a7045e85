pub mod errors;
pub mod menu;
pub mod order;
pub mod ports;
pub mod report;
