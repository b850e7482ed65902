pub mod account_service;
pub mod media_service;
pub mod quiz_service;
