//! HTTP request handlers

pub mod favicon;
pub mod health;
