use ard_ecs::{
    chunk::Chunk,
    component::{registry::TypeRegistry, ComponentType},
    key::ComponentKey,
    world::World,
};
use ard_log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::{SaveLoadConfig, WorkerPool},
    deserializer::Deserializer,
    error::SaveLoadError,
    format::{HeaderComponent, HeaderSaver},
    saver::{new_saver, GenericSaver},
};

/// Saves a chosen set of component kinds out of a world.
#[derive(Default)]
pub struct Saver {
    savers: Vec<Box<dyn GenericSaver>>,
    config: SaveLoadConfig,
    pool: WorkerPool,
}

impl Saver {
    /// Saves the kind. Including a kind twice replaces the earlier saver.
    pub fn include(mut self, ty: &ComponentType) -> Self {
        let saver = new_saver(ty);
        match self.savers.iter_mut().find(|s| s.key() == ty.key()) {
            Some(existing) => *existing = saver,
            None => self.savers.push(saver),
        }
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

    /// Saves every registered kind, in key order.
    pub fn include_all(self, registry: &TypeRegistry) -> Self {
        let mut types: Vec<_> = registry.iter().collect();
        types.sort_by_key(|ty| ty.key());
        types.into_iter().fold(self, |saver, ty| saver.include(ty))
    }

    pub fn with_config(mut self, config: SaveLoadConfig) -> Result<Self, SaveLoadError> {
        self.pool = WorkerPool::new(&config)?;
        self.config = config;
        Ok(self)
    }

    /// Keys of the included kinds, in the order their records are written.
    pub fn keys(&self) -> impl Iterator<Item = ComponentKey> + '_ {
        self.savers.iter().map(|s| s.key())
    }

    #[inline]
    pub fn save(&self, world: &World) -> Result<SaveData, SaveLoadError> {
        self.save_chunks(world.chunks())
    }

    /// Encodes every included kind found in `chunks`. Kinds no chunk has are left out.
    pub fn save_chunks(&self, chunks: &[Chunk]) -> Result<SaveData, SaveLoadError> {
        let records = self.pool.install(|| {
            if self.config.parallel_serialize {
                self.savers
                    .par_iter()
                    .map(|saver| saver.serialize(chunks))
                    .collect::<Result<Vec<_>, _>>()
            } else {
                self.savers
                    .iter()
                    .map(|saver| saver.serialize(chunks))
                    .collect::<Result<Vec<_>, _>>()
            }
        })?;

        let mut bytes = Vec::with_capacity(records.iter().map(|r| r.len()).sum());
        records
            .iter()
            .for_each(|record| bytes.extend_from_slice(record.as_bytes()));

        debug!(
            "saved {} component kinds in {} bytes",
            records.iter().filter(|r| !r.is_empty()).count(),
            bytes.len()
        );
        Ok(SaveData { bytes })
    }
}

/// A complete save. Contains one kind record per saved component kind.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    bytes: Vec<u8>,
}

/// One component kind's segment of the save data, header included.
#[derive(Debug, Copy, Clone)]
pub struct KindRecord<'a> {
    pub key: ComponentKey,
    pub data: &'a [u8],
}

impl SaveData {
    #[inline]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn records(&self) -> Result<Vec<KindRecord<'_>>, SaveLoadError> {
        split_records(&self.bytes)
    }

    /// Keys of every kind record, in the order they appear.
    pub fn keys(&self) -> Result<Vec<ComponentKey>, SaveLoadError> {
        Ok(self.records()?.into_iter().map(|r| r.key).collect())
    }
}

/// Splits save data into kind records using only their headers.
pub fn split_records(data: &[u8]) -> Result<Vec<KindRecord<'_>>, SaveLoadError> {
    const MIN_LENGTH: usize =
        std::mem::size_of::<HeaderSaver>() + std::mem::size_of::<HeaderComponent>();

    let mut records = Vec::default();
    let mut offset = 0;
    while offset < data.len() {
        let remaining = data.len() - offset;
        if remaining < std::mem::size_of::<HeaderSaver>() {
            return Err(SaveLoadError::TruncatedRecord {
                offset,
                length: std::mem::size_of::<HeaderSaver>(),
                remaining,
            });
        }

        let header = Deserializer::new(&data[offset..]).read::<HeaderSaver>();
        let length = header.length_in_bytes;
        let key = header.key;

        let length = match usize::try_from(length) {
            Ok(length) if length >= MIN_LENGTH => length,
            _ => {
                return Err(SaveLoadError::InvalidRecordLength {
                    offset,
                    length: length as i64,
                })
            }
        };

        if length > remaining {
            return Err(SaveLoadError::TruncatedRecord {
                offset,
                length,
                remaining,
            });
        }

        records.push(KindRecord {
            key: ComponentKey(key),
            data: &data[offset..offset + length],
        });
        offset += length;
    }

    Ok(records)
}
