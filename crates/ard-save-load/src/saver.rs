use ard_ecs::{
    chunk::{column::Column, Chunk},
    component::{ComponentType, StorageKind},
    key::ComponentKey,
};
use ard_log::{error, warn};
use rayon::prelude::*;

use crate::{
    buffer_saver::BufferSaver,
    component_save::ComponentSave,
    component_saver::ComponentSaver,
    deserializer::{Deserializer, PodSlice},
    entity_map::EntityRemap,
    error::SaveLoadError,
    format::{EnableBits, HeaderChunk, ENTITY_INDEX_SIZE},
    serializer::Serializer,
};

/// Saves and loads every value of one component kind.
pub trait GenericSaver: Send + Sync {
    /// Description of the kind this saver handles.
    fn save(&self) -> &ComponentSave;

    #[inline]
    fn key(&self) -> ComponentKey {
        self.save().key()
    }

    /// Encodes the kind from every chunk that has it into one kind record. The returned
    /// serializer is empty if no chunk had any entities with the kind.
    fn serialize(&self, chunks: &[Chunk]) -> Result<Serializer, SaveLoadError>;

    /// Decodes one kind record and writes it onto the matching entities in `chunks`. Returns how
    /// many entities were written to.
    ///
    /// On error nothing in `chunks` has been modified.
    fn deserialize(
        &self,
        data: &[u8],
        chunks: &mut [Chunk],
        ctx: &mut LoadContext,
    ) -> Result<usize, SaveLoadError>;
}

/// Creates the saver matching how the kind is stored.
pub fn new_saver(ty: &ComponentType) -> Box<dyn GenericSaver> {
    match ty.storage() {
        StorageKind::Component => Box::new(ComponentSaver::new(ty)),
        StorageKind::Buffer => Box::new(BufferSaver::new(ty)),
    }
}

/// State shared by every saver during one load.
pub struct LoadContext<'a> {
    pub remap: &'a EntityRemap,
    pub diagnostics: Diagnostics,
    /// Apply decoded data to chunks on the rayon pool.
    pub parallel: bool,
}

impl<'a> LoadContext<'a> {
    pub fn new(remap: &'a EntityRemap) -> Self {
        Self {
            remap,
            diagnostics: Diagnostics::default(),
            parallel: true,
        }
    }
}

/// Something that went wrong while loading that did not stop the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A saved entity has no live counterpart, so its data was dropped.
    MissingEntity { key: ComponentKey, saved: u32 },
    /// A kind was skipped because its element size changed since it was saved.
    ElementSizeMismatch {
        key: ComponentKey,
        saved: usize,
        live: usize,
    },
    /// The save data contains a kind the loader doesn't know about.
    UnknownKind { key: ComponentKey },
}

impl Diagnostic {
    /// Fatal diagnostics mean a whole kind was not loaded.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Diagnostic::ElementSizeMismatch { .. })
    }
}

/// Collected diagnostics. Each one is also logged as it is reported.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    log_missing: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            entries: Vec::default(),
            log_missing: true,
        }
    }
}

impl Diagnostics {
    /// `log_missing` controls whether every dropped entity is logged. Loads with large remap
    /// gaps can drop a lot of them.
    pub fn new(log_missing: bool) -> Self {
        Self {
            entries: Vec::default(),
            log_missing,
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MissingEntity { key, saved } => {
                if self.log_missing {
                    warn!("dropping component `{key}` of saved entity {saved} with no live entity");
                }
            }
            Diagnostic::ElementSizeMismatch { key, saved, live } => {
                error!(
                    "skipping component `{key}`: saved element size {saved} does not match \
                    live element size {live}"
                );
            }
            Diagnostic::UnknownKind { key } => {
                warn!("skipping unknown component `{key}` in save data");
            }
        }
        self.entries.push(diagnostic);
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of dropped saved entities.
    pub fn missing_entities(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingEntity { .. }))
            .count()
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_fatal)
    }
}

/// Chunks holding at least one entity with the kind, along with the kinds column.
pub(crate) fn saved_chunks(
    chunks: &[Chunk],
    key: ComponentKey,
) -> impl Iterator<Item = (&Chunk, &Column)> {
    chunks
        .iter()
        .filter(|chunk| !chunk.is_empty())
        .filter_map(move |chunk| chunk.column(key).map(|column| (chunk, column)))
}

/// Bytes every chunk record takes before its payload.
#[inline]
pub(crate) fn chunk_prefix_size(len: usize, enableable: bool) -> usize {
    let bits = if enableable {
        std::mem::size_of::<EnableBits>()
    } else {
        0
    };
    std::mem::size_of::<HeaderChunk>() + len * ENTITY_INDEX_SIZE + bits
}

/// Writes the chunk header, saved entity ids and enable bits of a chunk record.
pub(crate) fn write_chunk_prefix(
    serializer: &mut Serializer,
    chunk: &Chunk,
    column: &Column,
    enableable: bool,
) {
    serializer.append(&HeaderChunk {
        length: chunk.len() as i32,
    });

    let ids = serializer.allocate_n::<u32>(chunk.len());
    for (i, entity) in chunk.entities().iter().enumerate() {
        serializer.write(ids, i, &entity.id());
    }

    if enableable {
        // Columns without a mask are always enabled
        let bits = column.enable_bits().unwrap_or([u64::MAX; 2]);
        serializer.append(&bits);
    }
}

/// A chunk record up to its payload.
pub(crate) struct ChunkPrefix<'a> {
    pub ids: PodSlice<'a, u32>,
    pub bits: Option<EnableBits>,
}

pub(crate) fn read_chunk_prefix<'a>(
    reader: &mut Deserializer<'a>,
    enableable: bool,
) -> ChunkPrefix<'a> {
    let header = reader.read::<HeaderChunk>();
    let len = header.length.max(0) as usize;
    let ids = reader.read_buffer::<u32>(len);
    let bits = if enableable {
        Some(reader.read::<EnableBits>())
    } else {
        None
    };
    ChunkPrefix { ids, bits }
}

/// Runs `apply` on every chunk, in parallel if requested. Returns the sum of the results.
pub(crate) fn apply_chunks<F>(chunks: &mut [Chunk], parallel: bool, apply: F) -> usize
where
    F: Fn(&mut Chunk) -> usize + Send + Sync,
{
    if parallel {
        chunks.par_iter_mut().map(|chunk| apply(chunk)).sum()
    } else {
        chunks.iter_mut().map(|chunk| apply(chunk)).sum()
    }
}

/// Total size of a kind record as stored in its header.
pub(crate) fn record_length(key: ComponentKey, bytes: usize) -> Result<i32, SaveLoadError> {
    i32::try_from(bytes).map_err(|_| SaveLoadError::RecordTooLarge { key, bytes })
}
