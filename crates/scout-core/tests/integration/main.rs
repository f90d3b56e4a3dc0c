mod common;
mod discovery_tests;
mod validation_tests;
