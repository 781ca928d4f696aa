pub mod cli_client;
pub mod models;
pub mod portal;
pub mod router;
pub mod services;
pub mod utils;
