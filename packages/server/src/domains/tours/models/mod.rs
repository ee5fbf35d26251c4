pub mod tour;

pub use tour::{Tour, FEATURED_LIMIT, LIKED_BY};
