#![cfg(test)]

pub mod common;
pub mod config_tests;
pub mod provisioning_tests;
