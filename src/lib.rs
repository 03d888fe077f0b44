pub mod afk;
pub mod ai_gate;
pub mod commands;
pub mod config;
pub mod database;
pub mod duration;
pub mod error;
pub mod events;
pub mod gateway;
pub mod generation;
pub mod modlog;
pub mod personas;
pub mod router;
