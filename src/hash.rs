//! Key hasher: CRC-32 (Castagnoli polynomial) followed by Jenkins' 32-bit
//! integer mix and a Knuth multiplicative step.
//!
//! The output is part of the table's observable layout: two
//! implementations agree on bucket indices only if they agree on every
//! bit produced here. The CRC variant is byte-at-a-time with an initial
//! register of 0 and no final XOR, so it is *not* interchangeable with
//! the usual CRC-32C checksum (which starts from and XORs with `!0`).

/// Reflected Castagnoli polynomial.
const POLY: u32 = 0x82F6_3B78;

/// Knuth's multiplicative constant, `2^32 / phi`.
const KNUTH: u32 = 2_654_435_761;

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = make_table();

/// CRC-32 of `bytes` over the Castagnoli table, register starting at 0.
///
/// The empty string hashes to 0.
pub fn crc32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |crc, &b| {
        CRC_TABLE[((crc as u8) ^ b) as usize] ^ (crc >> 8)
    })
}

/// Robert Jenkins' 32-bit mix followed by Knuth's multiplicative method.
#[inline]
pub fn mix(mut key: u32) -> u32 {
    key = key.wrapping_add(key << 12);
    key ^= key >> 22;
    key = key.wrapping_add(key << 4);
    key ^= key >> 9;
    key = key.wrapping_add(key << 10);
    key ^= key >> 2;
    key = key.wrapping_add(key << 7);
    key ^= key >> 12;
    (key >> 3).wrapping_mul(KNUTH)
}

/// Full 32-bit hash of a key, before reduction to a bucket.
#[inline]
pub fn hash_key(bytes: &[u8]) -> u32 {
    mix(crc32(bytes))
}

/// Home bucket of `bytes` in a table of `capacity` slots.
///
/// `capacity` must be non-zero.
#[inline]
pub fn bucket(bytes: &[u8], capacity: usize) -> usize {
    hash_key(bytes) as usize % capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_pinned_entries() {
        assert_eq!(
            &CRC_TABLE[..4],
            &[0x0000_0000, 0xF26B_8303, 0xE13B_70F7, 0x1350_F3F4]
        );
        assert_eq!(CRC_TABLE[4], 0xC79A_971F);
        assert_eq!(CRC_TABLE[128], 0x82F6_3B78);
        assert_eq!(CRC_TABLE[255], 0xAD7D_5351);
    }

    #[test]
    fn crc_of_empty_is_zero() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(hash_key(b""), 0);
    }

    #[test]
    fn crc_sample_strings() {
        let cases: [(&str, u32); 7] = [
            ("life", 0xF7B0_3D45),
            ("test", 0xCEC7_3907),
            ("test2", 0x05DC_9A94),
            ("intVar", 0xF611_D28D),
            ("floatVar", 0xFA3D_2A21),
            ("proc", 0x9978_E176),
            ("123456789", 0x58E3_FA20),
        ];
        for (s, expected) in cases {
            assert_eq!(crc32(s.as_bytes()), expected, "crc32({s:?})");
        }
    }

    #[test]
    fn mixed_hash_is_pinned() {
        assert_eq!(hash_key(b"life"), 0xB562_1E94);
        assert_eq!(hash_key(b"test"), 0xF48F_086B);
        assert_eq!(hash_key(b"proc"), 0x2DD9_C7FF);
    }

    #[test]
    fn bucket_reduces_modulo_capacity() {
        assert_eq!(bucket(b"life", 2), 0);
        assert_eq!(bucket(b"test", 2), 1);
        assert_eq!(bucket(b"life", 8), 4);
        assert_eq!(bucket(b"proc", 16), 15);
        for cap in [1usize, 2, 4, 64, 1 << 20] {
            assert!(bucket(b"anything", cap) < cap);
        }
    }

    #[test]
    fn only_length_covered_bytes_matter() {
        let buf = b"test2";
        assert_eq!(crc32(&buf[..4]), crc32(b"test"));
    }
}
