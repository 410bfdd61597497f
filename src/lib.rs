pub mod config;
pub mod coordinator;
pub mod error;
pub mod pipeline;

pub use config::Settings;
pub use coordinator::{CollectCoordinator, CollectCoordinatorBuilder};
pub use error::{CollectError, LedgerError, ProtocolError, SettingsError};
pub use pipeline::collect::{CollectStage, SharedImageTotal};
pub use pipeline::{StageMessage, StageModule, TaskType};
