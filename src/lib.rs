//! Inventory service
//!
//! A gRPC service owning a catalogue of bookable resources (rooms, desks,
//! equipment). Reads are public; mutations are gated by role through an
//! external identity service.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod services;
pub mod storage;
pub mod transport;
pub mod utils;

pub mod proto {
    tonic::include_proto!("inventory");

    /// Encoded descriptors for the inventory protos, served over reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("inventory_descriptor");
}
