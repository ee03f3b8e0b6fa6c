pub mod buffer;
pub mod communication;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod protocol;
