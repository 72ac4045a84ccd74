pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod report;
pub mod session;
pub mod transport;

pub use catalog::{Catalog, RequestSpec, Scenario, Strategy};
pub use config::ProbeConfig;
pub use engine::{Engine, Pacer, RunSummary, ThreadPacer};
pub use error::{ProbeError, Result};
pub use report::Reporter;
pub use session::SessionContext;
