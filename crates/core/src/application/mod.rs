// Application Layer - Lifecycle use cases

pub mod catalog;
pub mod clean;
pub mod constants;
pub mod control_surface;
pub mod orchestrator;
pub mod panic_guard;
pub mod self_check;
pub mod shutdown_hooks;

// Re-exports
pub use catalog::ComponentSet;
pub use clean::{CleanReport, CleanService, TableDump};
pub use control_surface::ControlSurface;
pub use orchestrator::{LifecycleError, Orchestrator};
pub use panic_guard::{execute_guarded, execute_guarded_async, PanicGuardResult};
pub use self_check::{LivenessError, SelfCheck};
pub use shutdown_hooks::ShutdownHooks;
