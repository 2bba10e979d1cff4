//! Public JSON API handlers.

pub mod cars;
pub mod order;
pub mod products;
pub mod work_photos;
