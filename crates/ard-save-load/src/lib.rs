//! Binary save and load of chunked component data.
//!
//! A [`save_data::Saver`] encodes each included component kind into its own kind record, and a
//! [`load_data::Loader`] decodes those records back onto live entities, translating saved entity
//! ids through an [`entity_map::EntityRemap`].

pub mod buffer_saver;
pub mod component_save;
pub mod component_saver;
pub mod config;
pub mod deserializer;
pub mod entity_map;
pub mod error;
pub mod format;
pub mod load_data;
pub mod save_data;
pub mod saver;
pub mod serializer;


pub mod prelude {
    pub use crate::config::SaveLoadConfig;
    pub use crate::entity_map::EntityRemap;
    pub use crate::error::SaveLoadError;
    pub use crate::load_data::{LoadReport, Loader};
    pub use crate::save_data::{KindRecord, SaveData, Saver};
    pub use crate::saver::{new_saver, Diagnostic, Diagnostics, GenericSaver, LoadContext};
}
