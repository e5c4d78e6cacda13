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

/// Saver for kinds with one fixed-size value per entity.
pub struct ComponentSaver {
    save: ComponentSave,
}

/// A saved value waiting to be applied to a live entity.
#[derive(Debug, Copy, Clone)]
struct DecodedComponent<'a> {
    data: &'a [u8],
    /// `None` when the save data has no enable bits.
    enabled: Option<bool>,
}

impl ComponentSaver {
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
    ) -> FxHashMap<Entity, DecodedComponent<'a>> {
        let count = header.count.max(0) as usize;
        let size = self.save.element_size();
        let mut decoded = FxHashMap::default();
        decoded.reserve(count);

        let mut read = 0;
        while read < count && !reader.is_empty() {
            let prefix = read_chunk_prefix(reader, header.is_enableable());
            let data = reader.read_bytes(prefix.ids.len() * size);

            for (i, saved) in prefix.ids.iter().enumerate() {
                let Some(entity) = ctx.remap.try_get_entity(saved) else {
                    ctx.diagnostics.report(Diagnostic::MissingEntity {
                        key: self.save.key(),
                        saved,
                    });
                    continue;
                };

                decoded.insert(
                    entity,
                    DecodedComponent {
                        data: &data[i * size..(i + 1) * size],
                        enabled: prefix.bits.map(|bits| ComponentSave::is_set(&bits, i)),
                    },
                );
            }

            read += prefix.ids.len();
        }

        decoded
    }
}

impl GenericSaver for ComponentSaver {
    fn save(&self) -> &ComponentSave {
        &self.save
    }

    fn serialize(&self, chunks: &[Chunk]) -> Result<Serializer, SaveLoadError> {
        let key = self.save.key();
        let enableable = self.save.is_enableable();
        let size = self.save.element_size();

        // Sizing
        let mut count = 0;
        let mut total = 0;
        for (chunk, _) in saved_chunks(chunks, key) {
            count += chunk.len();
            total += chunk_prefix_size(chunk.len(), enableable) + chunk.len() * size;
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
            element_size: size as i32,
            is_enableable: enableable as u8,
        });

        for (chunk, column) in saved_chunks(chunks, key) {
            write_chunk_prefix(&mut serializer, chunk, column, enableable);
            serializer.append_bytes(column.components());
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

        debug!("saved {count} entities with component `{key}` in {total} bytes");
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
            let Some((entities, column)) = chunk.entities_and_column_mut(key) else {
                return 0;
            };

            let mut applied = 0;
            for (i, entity) in entities.iter().enumerate() {
                let Some(value) = decoded.get(entity) else {
                    continue;
                };

                save.copy_element(value.data, column.component_mut(i), remap);
                if let Some(enabled) = value.enabled {
                    column.set_enabled(i, enabled);
                }
                applied += 1;
            }
            applied
        });

        trace!("applied component `{key}` to {applied} entities");
        Ok(applied)
    }
}
