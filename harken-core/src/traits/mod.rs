//! Hardware and collaborator abstraction traits
//!
//! Everything the core consumes but does not own lives behind these traits:
//! the display surface, the settings store, the storage mount, the network
//! stack and the raw button line. The firmware crate provides the real
//! implementations; tests provide fakes.

pub mod display;
pub mod settings;
pub mod system;

pub use display::{DisplayCommand, TermDisplay};
pub use settings::{SettingKind, SettingView, SettingsError, SettingsStore};
pub use system::{ButtonProbe, NetworkInfo, SeedSource, StorageMount, StorageSpace, TokenExchange};
