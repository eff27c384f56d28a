//! Derived Value Generator.
//!
//! Turns raw bytes from an [`EntropySource`] into typed values. This is the
//! only place where bit layouts and rejection sampling are defined; every
//! platform shares it.
//!
//! # Layouts
//! - `i32` / `i64`: big-endian composition of 4 / 8 raw bytes.
//! - `bool`: lowest bit of one raw byte.
//! - `f64`: upper 53 bits of a raw 64-bit word divided by 2^53.
//! - `f32`: upper 24 bits of a raw 32-bit word divided by 2^24.
//!
//! # Bounded values
//! `[0, bound)` masks the raw word to non-negative, computes
//! `limit = MAX - (MAX % bound)` and redraws until the masked value falls
//! below `limit`, then reduces modulo `bound`. `limit` is a multiple of
//! `bound`, so every residue is equally likely. The same formula is used at
//! both widths.

use alloc::vec::Vec;
use zeroize::Zeroizing;

use crate::entropy::EntropySource;
use crate::error::{RandomError, RandomResult};

/// 2^-53
const F64_SCALE: f64 = 1.0 / (1u64 << 53) as f64;
/// 2^-24
const F32_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

/// Fills `dest` from `source`, mapping failures to `GenerationFailure`.
pub fn fill<S>(source: &S, dest: &mut [u8]) -> RandomResult<()>
where
    S: EntropySource + ?Sized,
{
    if dest.is_empty() {
        return Ok(());
    }
    source
        .fill(dest)
        .map_err(|e| RandomError::generation(source.name(), e))
}

fn draw<S, const N: usize>(source: &S) -> RandomResult<Zeroizing<[u8; N]>>
where
    S: EntropySource + ?Sized,
{
    let mut raw = Zeroizing::new([0u8; N]);
    fill(source, &mut raw[..])?;
    Ok(raw)
}

pub fn next_u32<S>(source: &S) -> RandomResult<u32>
where
    S: EntropySource + ?Sized,
{
    let raw = draw::<S, 4>(source)?;
    Ok(u32::from_be_bytes(*raw))
}

pub fn next_u64<S>(source: &S) -> RandomResult<u64>
where
    S: EntropySource + ?Sized,
{
    let raw = draw::<S, 8>(source)?;
    Ok(u64::from_be_bytes(*raw))
}

/// Full-range `i32`.
pub fn next_i32<S>(source: &S) -> RandomResult<i32>
where
    S: EntropySource + ?Sized,
{
    next_u32(source).map(|v| v as i32)
}

/// Full-range `i64`.
pub fn next_i64<S>(source: &S) -> RandomResult<i64>
where
    S: EntropySource + ?Sized,
{
    next_u64(source).map(|v| v as i64)
}

/// Uniform value in `[0, bound)`. `bound` must already be validated as positive.
pub fn bounded_i32<S>(source: &S, bound: i32) -> RandomResult<i32>
where
    S: EntropySource + ?Sized,
{
    debug_assert!(bound > 0);
    if bound == 1 {
        return Ok(0);
    }

    let limit = i32::MAX - (i32::MAX % bound);
    loop {
        let value = next_i32(source)? & i32::MAX;
        if value < limit {
            return Ok(value % bound);
        }
    }
}

/// Uniform value in `[0, bound)`. `bound` must already be validated as positive.
pub fn bounded_i64<S>(source: &S, bound: i64) -> RandomResult<i64>
where
    S: EntropySource + ?Sized,
{
    debug_assert!(bound > 0);
    if bound == 1 {
        return Ok(0);
    }

    let limit = i64::MAX - (i64::MAX % bound);
    loop {
        let value = next_i64(source)? & i64::MAX;
        if value < limit {
            return Ok(value % bound);
        }
    }
}

/// Uniform value in `[min, min + span)`; `span` is the validated `max - min`.
pub fn range_i32<S>(source: &S, min: i32, span: i32) -> RandomResult<i32>
where
    S: EntropySource + ?Sized,
{
    bounded_i32(source, span).map(|offset| min + offset)
}

/// Uniform value in `[min, min + span)`; `span` is the validated `max - min`.
pub fn range_i64<S>(source: &S, min: i64, span: i64) -> RandomResult<i64>
where
    S: EntropySource + ?Sized,
{
    bounded_i64(source, span).map(|offset| min + offset)
}

pub fn next_bool<S>(source: &S) -> RandomResult<bool>
where
    S: EntropySource + ?Sized,
{
    let raw = draw::<S, 1>(source)?;
    Ok(raw[0] & 1 == 1)
}

/// Uniform `f64` in `[0, 1)` with 53 bits of precision.
pub fn next_f64<S>(source: &S) -> RandomResult<f64>
where
    S: EntropySource + ?Sized,
{
    next_u64(source).map(|v| (v >> 11) as f64 * F64_SCALE)
}

/// Uniform `f32` in `[0, 1)` with 24 bits of precision.
pub fn next_f32<S>(source: &S) -> RandomResult<f32>
where
    S: EntropySource + ?Sized,
{
    next_u32(source).map(|v| (v >> 8) as f32 * F32_SCALE)
}

/// Freshly allocated buffer of `size` random bytes, filled in one call.
pub fn next_bytes<S>(source: &S, size: usize) -> RandomResult<Vec<u8>>
where
    S: EntropySource + ?Sized,
{
    let mut out = Vec::new();
    out.try_reserve_exact(size).map_err(|_| {
        RandomError::insufficient("memory", alloc::format!("cannot allocate {} bytes", size))
    })?;
    out.resize(size, 0);
    fill(source, &mut out)?;
    Ok(out)
}
