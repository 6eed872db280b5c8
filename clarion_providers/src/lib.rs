#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP clients for the model endpoint and the news / fact-check sources.

pub mod fact_check;
pub mod gemini;
pub mod google_news;
mod http;
pub mod newsdata;

pub use fact_check::GoogleFactCheck;
pub use gemini::GeminiProvider;
pub use google_news::GoogleNewsTrending;
pub use http::build_client;
pub use newsdata::NewsData;
