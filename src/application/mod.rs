// Application layer: use cases and orchestration over the repository.

pub mod error;
mod locks;
pub mod service;

pub use error::*;
pub use locks::AccountLocks;
pub use service::*;
