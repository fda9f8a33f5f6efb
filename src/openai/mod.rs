mod core;
pub mod error;
pub mod inspect;
pub use self::core::*;
pub use error::CompletionError;
pub use inspect::{HttpLogger, HttpObserver};
