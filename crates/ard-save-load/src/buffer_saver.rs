use ard_ecs::{chunk::Chunk, component::ComponentType, entity::Entity};
use ard_log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::{
    component_save::ComponentSave,
    deserializer::Deserializer,
    error::SaveLoadError,
    format::{HeaderComponent, HeaderSaver},
    saver::{
        apply_chunks, chunk_prefix_size, read_chunk_prefix, record_length, saved_chunks,
        write_chunk_prefix, Diagnostic, GenericSaver, LoadContext,
    },
    serializer::Serializer,
};

/// Saver for kinds holding a variable length array of elements per entity.
///
/// Within a chunk record every entity's element count comes first, followed by all of the
/// element data. Keeping the counts together means they can be rewritten without touching the
/// payload.
pub struct BufferSaver {
    save: ComponentSave,
}

/// A saved buffer waiting to be applied to a live entity.
#[derive(Debug, Copy, Clone)]
struct DecodedBuffer<'a> {
    /// Every element of the buffer, back to back.
    data: &'a [u8],
    enabled: Option<bool>,
}

impl BufferSaver {
    pub fn new(ty: &ComponentType) -> Self {
        Self {
            save: ComponentSave::new(ty),
        }
    }

    fn decode<'a>(
        &self,
        reader: &mut Deserializer<'a>,
        header: &HeaderComponent,
        ctx: &mut LoadContext,
    ) -> FxHashMap<Entity, DecodedBuffer<'a>> {
        let count = header.count.max(0) as usize;
        let size = self.save.element_size();
        let mut decoded = FxHashMap::default();
        decoded.reserve(count);

        let mut read = 0;
        while read < count && !reader.is_empty() {
            let prefix = read_chunk_prefix(reader, header.is_enableable());
            let lengths = reader.read_buffer::<i32>(prefix.ids.len());

            for (i, (saved, len)) in prefix.ids.iter().zip(lengths.iter()).enumerate() {
                // Data must be consumed even for dropped entities to stay in step
                let data = reader.read_bytes(len.max(0) as usize * size);

                let Some(entity) = ctx.remap.try_get_entity(saved) else {
                    ctx.diagnostics.report(Diagnostic::MissingEntity {
                        key: self.save.key(),
                        saved,
                    });
                    continue;
                };

                decoded.insert(
                    entity,
                    DecodedBuffer {
                        data,
                        enabled: prefix.bits.map(|bits| ComponentSave::is_set(&bits, i)),
                    },
                );
            }

            read += prefix.ids.len();
        }

        decoded
    }
}

impl GenericSaver for BufferSaver {
    fn save(&self) -> &ComponentSave {
        &self.save
    }

    fn serialize(&self, chunks: &[Chunk]) -> Result<Serializer, SaveLoadError> {
        let key = self.save.key();
        let enableable = self.save.is_enableable();

        // Sizing
        let mut count = 0;
        let mut total = 0;
        for (chunk, column) in saved_chunks(chunks, key) {
            count += chunk.len();
            total += chunk_prefix_size(chunk.len(), enableable)
                + chunk.len() * std::mem::size_of::<i32>();
            total += (0..chunk.len())
                .map(|i| column.buffer(i).len())
                .sum::<usize>();
        }

        if count == 0 {
            return Ok(Serializer::default());
        }
        total += std::mem::size_of::<HeaderSaver>() + std::mem::size_of::<HeaderComponent>();
        let length_in_bytes = record_length(key, total)?;

        // Writing
        let mut serializer = Serializer::default();
        serializer.reserve_extra_capacity(total);

        let header = serializer.allocate::<HeaderSaver>();
        serializer.append(&HeaderComponent {
            count: count as i32,
            element_size: self.save.element_size() as i32,
            is_enableable: enableable as u8,
        });

        for (chunk, column) in saved_chunks(chunks, key) {
            write_chunk_prefix(&mut serializer, chunk, column, enableable);

            let lengths = serializer.allocate_n::<i32>(chunk.len());
            for i in 0..chunk.len() {
                serializer.write(lengths, i, &(column.buffer_len(i) as i32));
            }

            for i in 0..chunk.len() {
                serializer.append_bytes(column.buffer(i));
            }
        }

        debug_assert_eq!(serializer.len(), total);
        serializer.write(
            header,
            0,
            &HeaderSaver {
                key: key.0,
                length_in_bytes,
            },
        );

        debug!("saved {count} buffers of component `{key}` in {total} bytes");
        Ok(serializer)
    }

    fn deserialize(
        &self,
        data: &[u8],
        chunks: &mut [Chunk],
        ctx: &mut LoadContext,
    ) -> Result<usize, SaveLoadError> {
        let key = self.save.key();
        let mut reader = Deserializer::new(data);
        reader.skip::<HeaderSaver>();
        let header = reader.read::<HeaderComponent>();
        self.save.check_header(&header)?;

        let decoded = self.decode(&mut reader, &header, ctx);
        if decoded.is_empty() {
            return Ok(0);
        }

        let remap = ctx.remap;
        let save = &self.save;
        let applied = apply_chunks(chunks, ctx.parallel, |chunk| {
            if chunk.is_empty() {
                return 0;
            }

            let Some((entities, column)) = chunk.entities_and_column_mut(key) else {
                return 0;
            };

            let mut applied = 0;
            for (i, entity) in entities.iter().enumerate() {
                let Some(value) = decoded.get(entity) else {
                    continue;
                };

                // Old contents are discarded, not merged
                let buffer = column.buffer_mut(i);
                buffer.clear();
                buffer.resize(value.data.len(), 0);
                save.copy_strided(value.data, buffer, remap);

                if let Some(enabled) = value.enabled {
                    column.set_enabled(i, enabled);
                }
                applied += 1;
            }
            applied
        });

        trace!("applied buffer `{key}` to {applied} entities");
        Ok(applied)
    }
}
