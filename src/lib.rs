//! Front-rs library - static SPA host with an API reverse proxy.

pub mod cli;
pub mod colors;
pub mod config;
pub mod handlers;
pub mod middleware;
