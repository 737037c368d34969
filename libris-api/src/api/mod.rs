//! HTTP API handlers for libris-api

pub mod auth;
pub mod authors;
pub mod books;
pub mod buildinfo;
pub mod health;
pub mod links;

pub use auth::{admin_middleware, RequestIdentity};
pub use authors::{create_author, delete_author, get_author, list_authors, update_author};
pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use buildinfo::get_build_info;
pub use health::health_routes;
