//! gRPC request handlers.

pub mod inventory;

pub use inventory::InventoryGrpcService;
