//! AK_In_Web: a personal home page with an admin-gated book library and a
//! static, tag-filtered listing page.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod render;
pub mod server;
pub mod session;
pub mod storage;
pub mod user_models;
pub mod user_storage;
