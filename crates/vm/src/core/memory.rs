/// The [`Memory`] struct represents the memory of an EVM frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    /// Vector storing memory data
    pub memory: Vec<u8>,
}

impl Memory {
    /// Creates a new, empty [`Memory`]
    pub fn new() -> Memory {
        Memory { memory: Vec::new() }
    }

    /// Gets the current size of the memory in bytes.
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let memory = Memory::new();
    /// assert_eq!(memory.size(), 0);
    /// ```
    pub fn size(&self) -> usize {
        self.memory.len()
    }

    /// Extends the memory to cover `offset..offset + size`, rounded up to a whole word.
    /// A zero `size` never extends the memory.
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.extend(0, 33);
    /// assert_eq!(memory.size(), 64);
    /// ```
    pub fn extend(&mut self, offset: usize, size: usize) {
        if size == 0 {
            return;
        }

        let new_mem_size = offset.saturating_add(size).saturating_add(31) / 32 * 32;
        if new_mem_size > self.size() {
            self.memory.resize(new_mem_size, 0u8);
        }
    }

    /// Store the given bytes in the memory at the given offset, with a fixed size.
    /// Shorter values are left-padded with zeros, longer ones are truncated. May extend the
    /// memory if necessary.
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, 32, &[0xff]);
    /// assert_eq!(memory.read(31, 1), vec![0xff]);
    /// assert_eq!(memory.read(0, 31), vec![0u8; 31]);
    /// ```
    pub fn store(&mut self, offset: usize, size: usize, value: &[u8]) {
        if size == 0 {
            return;
        }

        let value_len = value.len();
        let value: Vec<u8> = if value_len >= size {
            value[..size].to_vec()
        } else {
            // prepend null bytes until the value is the desired size
            // ex, ff with size 4 -> 00 00 00 ff
            let mut padded = vec![0u8; size - value_len];
            padded.extend_from_slice(value);
            padded
        };

        self.extend(offset, size);
        self.memory[offset..offset + size].copy_from_slice(&value);
    }

    /// Read the given number of bytes from the memory at the given offset.
    /// If the offset + size is greater than the current size of the memory, null bytes will be
    /// appended to the value.
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, 2, &[0xde, 0xad]);
    /// assert_eq!(memory.read(1, 3), vec![0xad, 0x00, 0x00]);
    /// ```
    pub fn read(&self, offset: usize, size: usize) -> Vec<u8> {
        if offset.saturating_add(size) > self.size() {
            let mut value = Vec::with_capacity(size);

            if offset <= self.size() {
                value.extend_from_slice(&self.memory[offset..]);
            }

            value.resize(size, 0u8);
            value
        } else {
            self.memory[offset..offset + size].to_vec()
        }
    }

    /// Copies `size` bytes within memory from `src` to `dest`. Both ranges must already be
    /// covered by [`Memory::extend`].
    pub fn copy_within(&mut self, src: usize, dest: usize, size: usize) {
        if size == 0 {
            return;
        }
        self.memory.copy_within(src..src + size, dest);
    }

    /// Calculate the current memory cost
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, 32, &[0xff]);
    /// assert_eq!(memory.memory_cost(), 3);
    /// ```
    pub fn memory_cost(&self) -> u64 {
        Self::cost_of_words(self.size().div_ceil(32) as u64)
    }

    /// calculate the memory cost of extending the memory to cover `offset..offset + size`
    ///
    /// ```
    /// use ferret_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, 32, &[0xff]);
    /// assert_eq!(memory.expansion_cost(0, 32), 0);
    /// assert_eq!(memory.expansion_cost(0, 64), 3);
    /// ```
    pub fn expansion_cost(&self, offset: usize, size: usize) -> u64 {
        if size == 0 {
            return 0;
        }

        let new_memory_word_size = (offset.saturating_add(size).saturating_add(31) / 32) as u64;
        Self::cost_of_words(new_memory_word_size).saturating_sub(self.memory_cost())
    }

    fn cost_of_words(words: u64) -> u64 {
        (words.saturating_mul(words) / 512).saturating_add(words.saturating_mul(3))
    }
}

#[cfg(test)]
mod tests {
    use ferret_common::utils::strings::decode_hex;

    use super::*;

    #[test]
    fn test_mstore_simple() {
        let mut memory = Memory::new();
        memory.store(
            0,
            32,
            &decode_hex("00000000000000000000000000000000000000000000000000000000000000ff")
                .expect("failed to decode hex"),
        );
        assert_eq!(
            memory.memory,
            decode_hex("00000000000000000000000000000000000000000000000000000000000000ff")
                .expect("failed to decode hex"),
        );
    }

    #[test]
    fn test_mstore_offset() {
        let mut memory = Memory::new();
        memory.store(4, 32, &[0xff]);
        assert_eq!(
            memory.memory,
            decode_hex("0000000000000000000000000000000000000000000000000000000000000000000000ff00000000000000000000000000000000000000000000000000000000").expect("failed to decode hex"),
        );
    }

    #[test]
    fn test_mstore8() {
        let mut memory = Memory::new();
        memory.store(0, 1, &[0xff]);
        assert_eq!(
            memory.memory,
            decode_hex("ff00000000000000000000000000000000000000000000000000000000000000")
                .expect("failed to decode hex"),
        );
    }

    #[test]
    fn test_zero_sized_store_does_not_extend() {
        let mut memory = Memory::new();
        memory.store(1000, 0, &[]);
        assert_eq!(memory.size(), 0);
    }

    #[test]
    fn test_mload_pad_one() {
        let mut memory = Memory::new();
        memory.store(
            0,
            32,
            &decode_hex("11223344556677889900aabbccddeeff11223344556677889900aabbccddeeff")
                .expect("failed to decode hex"),
        );
        assert_eq!(
            memory.read(1, 32),
            decode_hex("223344556677889900aabbccddeeff11223344556677889900aabbccddeeff00")
                .expect("failed to decode hex"),
        );
    }

    #[test]
    fn test_copy_within_overlapping() {
        let mut memory = Memory::new();
        memory.store(0, 4, &[1, 2, 3, 4]);
        memory.copy_within(0, 2, 4);
        assert_eq!(memory.read(0, 6), vec![1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn test_memory_cost_2() {
        let mut memory = Memory::new();
        memory.store(32 * 32, 32, &[0x11]);
        assert_eq!(memory.memory_cost(), 101);
    }

    #[test]
    fn test_expansion_cost() {
        let memory = Memory::new();
        assert_eq!(memory.expansion_cost(0, 32), 3);
        assert_eq!(memory.expansion_cost(32 * 32, 32), 101);
        assert_eq!(memory.expansion_cost(usize::MAX, 0), 0);
    }
}
