//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod delete;
pub mod health;
pub mod links;
pub mod redirect;
pub mod stats;

pub use delete::{delete_link_handler, delete_link_post_handler};
pub use health::health_handler;
pub use links::{
    bulk_create_handler, create_link_handler, get_link_handler, link_clicks_handler,
    list_links_handler, refresh_preview_handler,
};
pub use redirect::redirect_handler;
pub use stats::click_stats_handler;
