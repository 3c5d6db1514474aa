// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects `AuthUser`; each handler checks the
// role it needs with `AuthUser::require`.

pub mod auth;         // whoami
pub mod file_pod;     // transactional file-POD delete + read
pub mod files;        // uploaded file serving
pub mod mail;         // outbound email
pub mod process_data; // job/OCR records from the authoritative backend
pub mod settings;     // connection setting
