// lanwatch-core: the watch cycle and its collaborators.
//
// A cycle asks the router for the active hosts (via lanwatch-api),
// diffs them against the whitelist, and drives the bandwidth-limit
// toggle accordingly, with best-effort webhook notification. All state
// lives for one cycle; nothing is persisted.

pub mod error;
pub mod mode;
pub mod model;
pub mod notify;
pub mod throttle;
pub mod watcher;

pub use error::CoreError;
pub use mode::{ModeSource, TrackingMode};
pub use model::{MacAddress, Whitelist};
pub use notify::Notifier;
pub use throttle::ThrottleClient;
pub use watcher::{CycleOutcome, ThrottleAction, Watcher};
