//! Command handlers

pub mod browse;
pub mod config;
pub mod fetch;
pub mod list;
pub mod login;
pub mod whoami;
