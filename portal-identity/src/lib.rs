//! Portal Identity - Supabase integration
//!
//! Implements the identity provider and profile store boundaries against Supabase
//! Auth and PostgREST, including the chunked `base64-` session cookie format.

pub mod client;
pub mod storage;
pub mod supabase;

pub use client::{session_cookie_options, SupabaseConfig, SESSION_COOKIE_MAX_AGE};
pub use supabase::{SupabaseClient, EXPIRY_MARGIN_SECS};
