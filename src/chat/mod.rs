mod core;
pub mod models;
pub mod normalize;
pub use self::core::*;
pub use models::Transcript;
pub use normalize::{Normalized, normalize};
