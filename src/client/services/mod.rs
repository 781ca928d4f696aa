pub mod auth_service;
pub mod gateway;
pub mod reports_service;
pub mod users_service;
