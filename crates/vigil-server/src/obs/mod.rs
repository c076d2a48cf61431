//! Observability: the server's metric families and the scrape snapshot.

pub mod metrics;
