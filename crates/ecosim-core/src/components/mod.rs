//! ECS Components
//!
//! Per-agent components, plus the resources they are read against: the
//! roster, the social graph, and process-wide simulation state.

pub mod agent;
pub mod globals;
pub mod network;

pub use agent::*;
pub use globals::*;
pub use network::*;
