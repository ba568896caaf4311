//! Adapter implementations for the metadata store port.

pub mod memory;
pub mod postgres;
