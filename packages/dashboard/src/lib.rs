pub mod admin;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod lifecycle;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use countdown::{CountdownEngine, CountdownEvent};
pub use error::{DashboardError, Result, SubmitError};
pub use lifecycle::{Anomaly, EndReason, ResolvedLifecycle, resolve};
pub use session::{CountdownDisplay, DashboardSession, DashboardSnapshot, Notice, Refresh};
