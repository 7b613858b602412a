pub mod registry;
pub mod refresh;

pub use registry::{ProviderBinding, ProviderRegistry, RegistryError};
pub use refresh::{RefreshError, RefreshOutcome, RefreshPipeline, RefreshStage};
