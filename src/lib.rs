//! Per-chat language packs and blacklist gating for a Telegram bot.

pub mod config;
pub mod db;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod server;
pub mod store;
pub mod telegram;
