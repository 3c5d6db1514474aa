// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT, role checked per handler)
pub mod public;    // /, /health, /auth/login
pub mod protected; // /api/*
