//! API contract models for the Warehouse Inventory Platform

mod product;
mod stock;

pub use product::*;
pub use stock::*;
