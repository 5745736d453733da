//! HTTP request handlers for the forecast API.

pub mod forecast;
pub mod health;
