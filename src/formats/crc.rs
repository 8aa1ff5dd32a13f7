//! CRC-64 checksums for snapshot files

use crc::{Crc, CRC_64_GO_ISO};

pub const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

pub fn checksum(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// Incremental CRC-64 digest
pub struct Digest {
    digest: crc::Digest<'static, u64>,
}

impl Digest {
    pub fn new() -> Self {
        Self {
            digest: CRC64.digest(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Feed words in their little-endian file encoding
    pub fn update_words(&mut self, words: &[u32]) {
        for w in words {
            self.digest.update(&w.to_le_bytes());
        }
    }

    pub fn finalize(self) -> u64 {
        self.digest.finalize()
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_matches_oneshot() {
        let data = b"edge values";
        let mut digest = Digest::new();
        digest.update(&data[..4]);
        digest.update(&data[4..]);
        assert_eq!(digest.finalize(), checksum(data));
    }

    #[test]
    fn test_words_hash_as_le_bytes() {
        let words = [0x0102_0304u32, 0xdead_beef];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let mut digest = Digest::new();
        digest.update_words(&words);
        assert_eq!(digest.finalize(), checksum(&bytes));
    }
}
