//! Biztime Service - companies and their invoices over HTTP/JSON.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
