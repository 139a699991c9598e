//! Remote song catalog: fetching the song list and the `Track` view-model.
//!
//! The catalog is fetched once at startup on a background thread. Records are
//! mapped into immutable `Track` values that live for the rest of the session.

mod client;
mod error;
mod model;
mod time;

pub use client::{CatalogClient, spawn_load};
pub use error::CatalogError;
pub use model::Track;

#[cfg(test)]
mod tests;
