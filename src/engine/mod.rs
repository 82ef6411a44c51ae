// Propatch Engine — everything that touches the outside world
// Store access, the settings patch itself, store discovery, and outcome
// reporting. Pure types and constants live in atoms/.

pub mod locator;
pub mod notifier;
pub mod patcher;
pub mod store;
