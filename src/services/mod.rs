//! Business services.

pub mod inventory;

pub use inventory::{InventoryError, InventoryService};
