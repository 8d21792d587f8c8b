//! Configuration types and loading for vorta

mod error;
mod loader;
mod record;

pub use error::ConfigError;
pub use loader::ConfigBundle;
#[allow(unused_imports)]
pub use loader::{CONFIG_DIR, RecordFormat, load_record, parse_record};
#[allow(unused_imports)]
pub use record::{ConfigRecord, ConfigVersion, FlowConfig, TaskConfig};
