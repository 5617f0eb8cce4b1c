//! Fixed-width bit-packed integer array.
//!
//! Backs the compact table representation: instead of one host reference per
//! slot, each slot stores an index into the deduplicated host list using only
//! `ceil(log2(hosts))` bits.

/// A fixed-size array of fixed-width unsigned integers.
///
/// The element width is chosen at construction and never changes; values wider
/// than the element width are rejected on write. Elements may straddle a word
/// boundary, so reads and writes touch at most two backing words.
#[derive(Debug, Clone)]
pub struct BitArray {
    words: Vec<u64>,
    width: u32,
    mask: u64,
    len: usize,
}

/// Widest supported element.
pub const MAX_BIT_WIDTH: u32 = 32;

impl BitArray {
    /// Create a zero-filled array of `len` elements, each `width` bits wide.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or greater than [`MAX_BIT_WIDTH`].
    #[must_use]
    pub fn new(width: u32, len: usize) -> Self {
        assert!(
            width >= 1 && width <= MAX_BIT_WIDTH,
            "bit width {width} out of range 1..={MAX_BIT_WIDTH}"
        );
        let total_bits = len * width as usize;
        let words = vec![0u64; total_bits.div_ceil(64) + 1];
        Self {
            words,
            width,
            mask: (1u64 << width) - 1,
            len,
        }
    }

    /// Minimum width able to hold indices `0..count`.
    #[must_use]
    pub fn width_for(count: usize) -> u32 {
        match count {
            0 | 1 => 1,
            n => (usize::BITS - (n - 1).leading_zeros()).min(MAX_BIT_WIDTH),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element width in bits.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Size of the backing storage in bytes.
    #[must_use]
    pub fn storage_bytes(&self) -> usize {
        self.words.len() * 8
    }

    /// Read the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u32 {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        let bit = index * self.width as usize;
        let word = bit / 64;
        let offset = (bit % 64) as u32;

        let mut value = self.words[word] >> offset;
        if offset + self.width > 64 {
            value |= self.words[word + 1] << (64 - offset);
        }
        (value & self.mask) as u32
    }

    /// Write `value` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `value` does not fit the element
    /// width.
    #[inline]
    pub fn set(&mut self, index: usize, value: u32) {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        assert!(
            u64::from(value) <= self.mask,
            "value {value} wider than {} bits",
            self.width
        );
        let bit = index * self.width as usize;
        let word = bit / 64;
        let offset = (bit % 64) as u32;

        self.words[word] &= !(self.mask << offset);
        self.words[word] |= u64::from(value) << offset;
        if offset + self.width > 64 {
            let spill = 64 - offset;
            self.words[word + 1] &= !(self.mask >> spill);
            self.words[word + 1] |= u64::from(value) >> spill;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_single_width() {
        let mut array = BitArray::new(1, 100);
        array.set(0, 1);
        array.set(63, 1);
        array.set(64, 1);
        array.set(99, 1);

        assert_eq!(array.get(0), 1);
        assert_eq!(array.get(1), 0);
        assert_eq!(array.get(63), 1);
        assert_eq!(array.get(64), 1);
        assert_eq!(array.get(99), 1);
    }

    #[test]
    fn test_word_straddling_elements() {
        // Width 5: element 12 spans bits 60..65, crossing the first word.
        let mut array = BitArray::new(5, 40);
        for i in 0..40 {
            array.set(i, (i as u32) % 32);
        }
        for i in 0..40 {
            assert_eq!(array.get(i), (i as u32) % 32, "element {i}");
        }
    }

    #[test]
    fn test_max_width() {
        let mut array = BitArray::new(32, 9);
        array.set(0, u32::MAX);
        array.set(8, 0xDEAD_BEEF);
        assert_eq!(array.get(0), u32::MAX);
        assert_eq!(array.get(8), 0xDEAD_BEEF);
    }

    #[test]
    fn test_overwrite_clears_previous_value() {
        let mut array = BitArray::new(7, 20);
        array.set(10, 127);
        array.set(10, 1);
        assert_eq!(array.get(10), 1);
        // Neighbors untouched.
        assert_eq!(array.get(9), 0);
        assert_eq!(array.get(11), 0);
    }

    #[test]
    fn test_width_for() {
        assert_eq!(BitArray::width_for(0), 1);
        assert_eq!(BitArray::width_for(1), 1);
        assert_eq!(BitArray::width_for(2), 1);
        assert_eq!(BitArray::width_for(3), 2);
        assert_eq!(BitArray::width_for(4), 2);
        assert_eq!(BitArray::width_for(5), 3);
        assert_eq!(BitArray::width_for(256), 8);
        assert_eq!(BitArray::width_for(257), 9);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let array = BitArray::new(4, 10);
        array.get(10);
    }

    #[test]
    #[should_panic(expected = "wider than")]
    fn test_set_too_wide() {
        let mut array = BitArray::new(4, 10);
        array.set(0, 16);
    }

    #[test]
    #[should_panic(expected = "bit width")]
    fn test_invalid_width() {
        BitArray::new(33, 10);
    }
}
