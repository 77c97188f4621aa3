///! Command handlers

pub mod auth;
pub mod entities;
pub mod timezones;
pub mod windows;
pub mod zones;
