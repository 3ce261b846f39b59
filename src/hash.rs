/// Polynomial rolling hash of `key`, reduced modulo `modulus` after every byte.
///
/// `hash = 0; for each byte c: hash = (hash * 31 + c) mod modulus`
///
/// Bytes are taken as unsigned. The result lies in `[0, modulus)`; a modulus of
/// zero yields zero.
#[must_use]
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub fn polynomial_hash(key: &[u8], modulus: usize) -> usize {
    if modulus == 0 {
        return 0;
    }

    // u128 keeps `hash * 31 + c` exact for every usize modulus
    let modulus = modulus as u128;
    let hash = key.iter().fold(0u128, |hash, &byte| (hash * 31 + u128::from(byte)) % modulus);

    // hash < modulus <= usize::MAX
    hash as usize
}

/// Slot visited on the `attempt`-th probe of the quadratic sequence starting at `home`:
/// `(home + attempt²) mod capacity`
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub(crate) fn quadratic_probe(home: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }

    let capacity = capacity as u128;
    let attempt = attempt as u128 % capacity;
    ((home as u128 + attempt * attempt) % capacity) as usize
}
