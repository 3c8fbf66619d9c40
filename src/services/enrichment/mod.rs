//! Film metadata enrichment
//!
//! Turns loosely specified recommendation strings into catalog-backed film
//! records. Each title is resolved to a catalog id, then details, directors
//! and images are fetched concurrently for that id. Titles are processed
//! concurrently with each other and reassembled in input order.

pub mod aggregator;
pub mod credits;
pub mod details;
pub mod images;
pub mod resolver;

pub use aggregator::FilmEnricher;
pub use credits::fetch_directors;
pub use details::fetch_details;
pub use images::{fetch_images, MAX_IMAGES_PER_KIND};
pub use resolver::resolve;
