pub mod models;
pub mod resolver;
pub mod store;

pub use models::{FavouriteReference, ResolvedFavourite};
pub use resolver::resolve;
pub use store::FavouriteStore;
