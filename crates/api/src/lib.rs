//! WhaleWatch API server.
//!
//! Endpoints:
//! - GET /health
//! - GET /api/portfolio/positions?address= — provider pass-through
//! - GET /api/portfolio/summary?address= — translated portfolio
//! - GET /api/features/{tier} — tier quotas
//! - GET /api/features/{tier}/{feature}?usage= — access check

pub mod routes;
pub mod state;
