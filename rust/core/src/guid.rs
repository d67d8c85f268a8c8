// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC GlobalId generation.
//!
//! An IfcGloballyUniqueId is a 128-bit UUID written as 22 characters of the
//! IFC base-64 alphabet (the first character carries the top two bits).

use uuid::Uuid;

const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Length of a compressed GlobalId.
pub const GLOBAL_ID_LEN: usize = 22;

/// Generate a fresh random GlobalId.
pub fn new_global_id() -> String {
    compress_uuid(Uuid::new_v4())
}

/// Compress a UUID into the 22-character IFC representation.
pub fn compress_uuid(uuid: Uuid) -> String {
    let value = uuid.as_u128();
    (0..GLOBAL_ID_LEN)
        .map(|i| {
            let shift = 6 * (GLOBAL_ID_LEN - 1 - i);
            ALPHABET[((value >> shift) & 0x3f) as usize] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_and_max() {
        assert_eq!(compress_uuid(Uuid::nil()), "0".repeat(22));
        // Top character only holds two bits
        assert_eq!(compress_uuid(Uuid::from_u128(u128::MAX)), format!("3{}", "$".repeat(21)));
    }

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let a = new_global_id();
        let b = new_global_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), GLOBAL_ID_LEN);
        assert!(a.bytes().all(|c| ALPHABET.contains(&c)));
    }
}
