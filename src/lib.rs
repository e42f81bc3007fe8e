//! EasyGen client: session, preference wizard and post generation against
//! the EasyGen backend.

pub mod api;
pub mod app;
pub mod auth;
pub mod busy;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod landing;
pub mod newsletter;
pub mod notify;
pub mod preferences;
pub mod session;
