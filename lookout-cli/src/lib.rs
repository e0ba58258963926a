pub mod app;
pub mod live;
pub mod sinks;
pub mod state;
pub mod telemetry;

pub use app::run as run_app;
