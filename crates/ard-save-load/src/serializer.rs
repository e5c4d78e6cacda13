use std::marker::PhantomData;

use bytemuck::Pod;

/// Append-only byte buffer for writing save data.
///
/// Nothing grows implicitly. Every write must be covered by a prior call to
/// [`Serializer::reserve_extra_capacity`], which is why savers size their output before writing
/// it. In exchange, the backing allocation never moves while a record is being written.
#[derive(Debug, Default)]
pub struct Serializer {
    data: Vec<u8>,
    /// Writes may not go past this many bytes.
    reserved: usize,
}

/// Position of values reserved with [`Serializer::allocate`] so they can be filled in later.
#[derive(Debug)]
pub struct Slot<T> {
    offset: usize,
    count: usize,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> Slot<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes that can still be written without reserving more.
    #[inline]
    pub fn remaining_reserved(&self) -> usize {
        self.reserved - self.data.len()
    }

    /// Guarantees that the next `additional` bytes, on top of whatever is already reserved, can be
    /// written without reallocating.
    pub fn reserve_extra_capacity(&mut self, additional: usize) {
        self.reserved += additional;
        self.data.reserve_exact(self.reserved - self.data.len());
    }

    /// Reserves room for one value to be written later through the returned slot. The bytes
    /// start zeroed.
    #[inline]
    pub fn allocate<T: Pod>(&mut self) -> Slot<T> {
        self.allocate_n(1)
    }

    /// Reserves room for `count` contiguous values to be written later through the returned slot.
    pub fn allocate_n<T: Pod>(&mut self, count: usize) -> Slot<T> {
        let size = count * std::mem::size_of::<T>();
        let offset = self.claim(size);
        self.data.resize(offset + size, 0);
        Slot {
            offset,
            count,
            _phantom: PhantomData,
        }
    }

    /// Writes the value at `index` of a slot.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds for the slot.
    #[inline]
    pub fn write<T: Pod>(&mut self, slot: Slot<T>, index: usize, value: &T) {
        let size = std::mem::size_of::<T>();
        let bytes = self.slot_bytes_mut(slot);
        bytes[index * size..(index + 1) * size].copy_from_slice(bytemuck::bytes_of(value));
    }

    /// The bytes of a previously allocated slot.
    #[inline]
    pub fn slot_bytes_mut<T: Pod>(&mut self, slot: Slot<T>) -> &mut [u8] {
        let size = slot.count * std::mem::size_of::<T>();
        &mut self.data[slot.offset..slot.offset + size]
    }

    #[inline]
    pub fn append<T: Pod>(&mut self, value: &T) {
        self.append_bytes(bytemuck::bytes_of(value));
    }

    #[inline]
    pub fn append_slice<T: Pod>(&mut self, values: &[T]) {
        self.append_bytes(bytemuck::cast_slice(values));
    }

    #[inline]
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.claim(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Start offset of a `size` byte write.
    ///
    /// # Panics
    /// Panics if the write would go past the reserved capacity.
    #[inline]
    fn claim(&mut self, size: usize) -> usize {
        let offset = self.data.len();
        assert!(
            offset + size <= self.reserved,
            "write of {size} bytes at offset {offset} exceeds reserved capacity of {} bytes",
            self.reserved
        );
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_after_write() {
        let mut serializer = Serializer::new();
        serializer.reserve_extra_capacity(12);

        let header = serializer.allocate::<u32>();
        serializer.append(&7u64);
        let len = serializer.len() as u32;
        serializer.write(header, 0, &len);

        assert_eq!(serializer.remaining_reserved(), 0);
        assert_eq!(&serializer.as_bytes()[..4], &12u32.to_ne_bytes());
        assert_eq!(&serializer.as_bytes()[4..], &7u64.to_ne_bytes());
    }

    #[test]
    fn no_reallocation_within_reservation() {
        let mut serializer = Serializer::new();
        serializer.reserve_extra_capacity(64);
        let ptr = serializer.as_bytes().as_ptr();

        let ids = serializer.allocate_n::<u32>(8);
        for i in 0..ids.len() {
            serializer.write(ids, i, &(i as u32));
        }
        serializer.append_slice(&[1u16; 16]);

        assert_eq!(serializer.as_bytes().as_ptr(), ptr);
        assert_eq!(serializer.len(), 64);
    }

    #[test]
    #[should_panic]
    fn write_without_reservation() {
        let mut serializer = Serializer::new();
        serializer.append(&1u32);
    }

    #[test]
    #[should_panic]
    fn write_past_reservation() {
        let mut serializer = Serializer::new();
        serializer.reserve_extra_capacity(3);
        serializer.append(&1u32);
    }
}
