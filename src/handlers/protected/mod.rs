// handlers/protected/mod.rs - Protected handlers (bearer session required)
//
// Route Prefix: /api/*
// Middleware: require_session, then require_admin_for_writes
pub mod apartments;
pub mod auth;
pub mod monthly_expenses;
pub mod monthly_rent;
pub mod stats;
pub mod transactions;
pub mod users;

use serde::Serialize;
use uuid::Uuid;

/// Body returned by every DELETE route
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: Uuid) -> Self {
        Self { id, deleted: true }
    }
}
