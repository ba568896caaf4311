//! Adapter implementations for invocation ports.

pub mod http;
