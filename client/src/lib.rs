// Networked game client: a blocking line-framed connection with a reader
// thread, plus the reconciler that merges remote entity state into the
// local simulation each tick. The simulation thread never blocks on I/O.

pub mod config;
pub mod net;
pub mod reconciler;
pub mod session;

pub use config::SessionConfig;
pub use net::NetClient;
pub use reconciler::Reconciler;
pub use session::NetSession;
