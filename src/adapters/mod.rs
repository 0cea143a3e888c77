pub mod apify;
pub mod google_search;
pub mod health_handler;
pub mod research_handler;
pub mod web_browser;
