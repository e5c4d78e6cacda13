use ard_ecs::{
    chunk::Chunk,
    component::{registry::TypeRegistry, ComponentType},
    key::ComponentKey,
    world::World,
};
use ard_log::debug;
use rustc_hash::FxHashMap;

use crate::{
    config::{SaveLoadConfig, WorkerPool},
    entity_map::EntityRemap,
    error::SaveLoadError,
    save_data::{split_records, SaveData},
    saver::{new_saver, Diagnostic, Diagnostics, GenericSaver, LoadContext},
};

/// Loads save data back into the entities of a world.
///
/// Only entities that already exist and already have a component are written to. Entities are
/// matched to saved data through an [`EntityRemap`] built by the caller.
#[derive(Default)]
pub struct Loader {
    savers: FxHashMap<ComponentKey, Box<dyn GenericSaver>>,
    config: SaveLoadConfig,
    pool: WorkerPool,
}

/// Outcome of a load.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    /// Number of entities written to, per kind record, in the order the records were loaded.
    pub applied: Vec<(ComponentKey, usize)>,
    pub diagnostics: Diagnostics,
}

impl LoadReport {
    /// Entities written to for a kind, summed over all of its records.
    pub fn applied_to(&self, key: ComponentKey) -> Option<usize> {
        self.applied
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, count)| *count)
            .reduce(|a, b| a + b)
    }
}

impl Loader {
    pub fn include(mut self, ty: &ComponentType) -> Self {
        self.savers.insert(ty.key(), new_saver(ty));
        self
    }

    pub fn include_key(
        self,
        registry: &TypeRegistry,
        key: ComponentKey,
    ) -> Result<Self, SaveLoadError> {
        match registry.get(key) {
            Some(ty) => Ok(self.include(ty)),
            None => Err(SaveLoadError::UnregisteredComponent(key)),
        }
    }

    pub fn include_all(self, registry: &TypeRegistry) -> Self {
        registry.iter().fold(self, |loader, ty| loader.include(ty))
    }

    pub fn with_config(mut self, config: SaveLoadConfig) -> Result<Self, SaveLoadError> {
        self.pool = WorkerPool::new(&config)?;
        self.config = config;
        Ok(self)
    }

    #[inline]
    pub fn load(
        &self,
        data: &SaveData,
        world: &mut World,
        remap: &EntityRemap,
    ) -> Result<LoadReport, SaveLoadError> {
        self.load_chunks(data.as_bytes(), world.chunks_mut(), remap)
    }

    /// Loads every kind record this loader knows about.
    ///
    /// Malformed record headers fail the whole load before anything is written. A kind whose
    /// element size changed is skipped and reported in the diagnostics, and the other kinds are
    /// still loaded.
    pub fn load_chunks(
        &self,
        data: &[u8],
        chunks: &mut [Chunk],
        remap: &EntityRemap,
    ) -> Result<LoadReport, SaveLoadError> {
        let records = split_records(data)?;

        let mut ctx = LoadContext {
            remap,
            diagnostics: Diagnostics::new(self.config.log_dropped_entities),
            parallel: self.config.parallel_apply,
        };
        let mut applied = Vec::with_capacity(records.len());

        for record in records {
            let Some(saver) = self.savers.get(&record.key) else {
                ctx.diagnostics
                    .report(Diagnostic::UnknownKind { key: record.key });
                continue;
            };

            let result = self
                .pool
                .install(|| saver.deserialize(record.data, chunks, &mut ctx));

            match result {
                Ok(count) => applied.push((record.key, count)),
                Err(SaveLoadError::ElementSizeMismatch { key, saved, live }) => {
                    ctx.diagnostics
                        .report(Diagnostic::ElementSizeMismatch { key, saved, live });
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            "loaded {} component kinds with {} diagnostics",
            applied.len(),
            ctx.diagnostics.len()
        );

        Ok(LoadReport {
            applied,
            diagnostics: ctx.diagnostics,
        })
    }
}
