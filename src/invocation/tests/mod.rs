//! Unit tests for the invocation gateway.
