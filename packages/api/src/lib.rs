pub mod client;
pub mod error;
pub mod session;
pub mod traits;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use session::{Session, SessionContext};
pub use traits::{AdminApi, HackathonApi};
