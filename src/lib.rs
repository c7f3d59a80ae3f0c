#[cfg(feature = "engine")]
pub use mongomigrate_engine::*;

#[cfg(feature = "scaffold")]
pub use mongomigrate_cli as scaffold;

pub use mongomigrate_store::StoreError;
