// Handlers module - API endpoint handlers

pub mod auth;
pub mod doors;
pub mod system;
pub mod visitors;
