//! Secure random source.
//!
//! Thin wrapper over the operating system CSPRNG. There is no
//! fallback generator: if the OS source fails, every caller gets
//! `VaultError::RandomSourceUnavailable` and must abort the operation.

use crate::error::{Result, VaultError};

/// Fill `buf` with bytes from the OS secure random source.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf).map_err(|e| {
        tracing::error!(error = %e, "secure random source failed");
        VaultError::RandomSourceUnavailable(e.to_string())
    })
}

/// Generate `len` random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Generate a fixed-size random array.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Uniform random index in `0..bound`.
///
/// Uses rejection sampling over `u32` draws so small bounds carry no modulo bias.
pub fn random_index(bound: usize) -> Result<usize> {
    if bound == 0 {
        return Err(VaultError::InvalidInput(
            "Random index bound must be positive".to_string(),
        ));
    }
    let bound = u32::try_from(bound)
        .map_err(|_| VaultError::InvalidInput("Random index bound too large".to_string()))?;

    // Largest multiple of `bound` that fits; draws at or above it are rejected.
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let value = u32::from_le_bytes(random_array::<4>()?);
        if value < zone {
            return Ok((value % bound) as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length() {
        assert_eq!(random_bytes(0).unwrap().len(), 0);
        assert_eq!(random_bytes(32).unwrap().len(), 32);
        assert_eq!(random_bytes(1000).unwrap().len(), 1000);
    }

    #[test]
    fn test_random_bytes_not_repeated() {
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_array_not_all_zero() {
        let bytes = random_array::<32>().unwrap();
        assert!(bytes.iter().any(|b| *b != 0));
    }

    #[test]
    fn test_random_index_in_range() {
        for bound in [1usize, 2, 7, 62, 94] {
            for _ in 0..200 {
                assert!(random_index(bound).unwrap() < bound);
            }
        }
    }

    #[test]
    fn test_random_index_covers_small_range() {
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[random_index(4).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_random_index_zero_bound_rejected() {
        assert!(matches!(random_index(0), Err(VaultError::InvalidInput(_))));
    }
}
