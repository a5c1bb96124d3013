pub mod handler;
pub mod model;
pub mod store;

pub use handler::*;
pub use model::*;
pub use store::*;
