pub mod cache;
pub mod pagination;
pub mod query;
pub mod wp_client;
