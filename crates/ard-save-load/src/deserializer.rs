use std::marker::PhantomData;

use bytemuck::Pod;

/// Read cursor over one segment of save data.
///
/// The reader trusts the length headers of the data it was given. Reading past the end of the
/// segment is a bug in the data or in the caller and panics.
#[derive(Debug, Clone)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    offset: usize,
}

/// Read-only view of `len` values of `T` that may not be aligned for `T`.
#[derive(Debug, Clone, Copy)]
pub struct PodSlice<'a, T> {
    bytes: &'a [u8],
    _phantom: PhantomData<T>,
}

impl<'a> Deserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Moves past one value of `T` without reading it.
    #[inline]
    pub fn skip<T: Pod>(&mut self) {
        self.read_bytes(std::mem::size_of::<T>());
    }

    #[inline]
    pub fn read<T: Pod>(&mut self) -> T {
        bytemuck::pod_read_unaligned(self.read_bytes(std::mem::size_of::<T>()))
    }

    #[inline]
    pub fn read_buffer<T: Pod>(&mut self, count: usize) -> PodSlice<'a, T> {
        PodSlice {
            bytes: self.read_bytes(count * std::mem::size_of::<T>()),
            _phantom: PhantomData,
        }
    }

    /// # Panics
    /// Panics if fewer than `len` bytes remain.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> &'a [u8] {
        assert!(
            len <= self.remaining(),
            "read of {len} bytes at offset {} overruns save data of {} bytes",
            self.offset,
            self.data.len()
        );
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        bytes
    }
}

impl<'a, T: Pod> PodSlice<'a, T> {
    #[inline]
    pub fn len(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => 0,
            size => self.bytes.len() / size,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        let size = std::mem::size_of::<T>();
        bytemuck::pod_read_unaligned(&self.bytes[index * size..(index + 1) * size])
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let bytes = self.bytes;
        bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_unaligned() {
        let mut data = vec![0xFFu8];
        data.extend_from_slice(&42u32.to_ne_bytes());
        data.extend_from_slice(&1i32.to_ne_bytes());
        data.extend_from_slice(&2i32.to_ne_bytes());

        let mut reader = Deserializer::new(&data);
        reader.skip::<u8>();
        assert_eq!(reader.read::<u32>(), 42);

        let values = reader.read_buffer::<i32>(2);
        assert_eq!(values.len(), 2);
        assert_eq!(values.get(1), 2);
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(reader.is_empty());
        assert_eq!(reader.offset(), data.len());
    }

    #[test]
    #[should_panic]
    fn read_past_end() {
        let data = [0u8; 3];
        let mut reader = Deserializer::new(&data);
        reader.read::<u32>();
    }
}
