//! Business logic services for the Warehouse Inventory Platform

pub mod inventory;
pub mod product;

pub use inventory::InventoryService;
pub use product::ProductService;
