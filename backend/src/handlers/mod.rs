//! HTTP handlers for the Warehouse Inventory Platform

pub mod health;
pub mod products;
pub mod warehouse_items;

pub use health::*;
pub use products::*;
pub use warehouse_items::*;
