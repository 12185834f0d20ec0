pub mod accounts;
pub mod cache;
pub mod feed;
pub mod follow;
pub mod handlers;
pub mod paginator;
pub mod response;
