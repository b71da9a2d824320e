// Application layer - Use cases over the host's history and state APIs
pub mod history_cache;
pub mod history_repository;
pub mod render;
pub mod waterfall_service;
