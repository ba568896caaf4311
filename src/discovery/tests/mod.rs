//! Unit tests for the discovery surface.

mod card_tests;
mod support;
