mod client;
pub(crate) mod error;
mod models;
mod repository;

pub use client::{FeedClient, FeedClientConfig, FetchDepartures};
pub use models::{Departure, FeedSnapshot, JourneyDirection};
pub use repository::FeedRepository;
