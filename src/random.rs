//! Deterministic random value generation for property tests.
//!
//! Every variable-length field receives a length in `1..MAX_SLICE_LENGTH`, so a
//! generated value never has an empty collection or byte string.

use crate::*;

/// Upper bound (exclusive) for generated sequence and byte-string lengths.
pub const MAX_SLICE_LENGTH: usize = 10;
/// Upper bound (exclusive) for generated string lengths.
pub const MAX_STRING_LENGTH: usize = 100;

/// A source of random primitives.
///
/// With the `rand` feature every `rand::RngCore` implements this, so a seeded
/// generator gives reproducible values.
pub trait RandSrc {
    fn get_bool(&mut self) -> bool;
    fn get_int8(&mut self) -> i8;
    fn get_int16(&mut self) -> i16;
    fn get_int32(&mut self) -> i32;
    fn get_int64(&mut self) -> i64;
    fn get_uint8(&mut self) -> u8;
    fn get_uint16(&mut self) -> u16;
    fn get_uint32(&mut self) -> u32;
    fn get_uint64(&mut self) -> u64;
    /// Used for lengths and variant selection.
    fn get_uint(&mut self) -> u64;
    fn get_float32(&mut self) -> f32;
    fn get_float64(&mut self) -> f64;
    fn get_string(&mut self, n: usize) -> String;
    fn get_bytes(&mut self, n: usize) -> Bytes;
}

/// Draws a collection length in `[1, MAX_SLICE_LENGTH - 1]`.
pub fn random_length<R: RandSrc + ?Sized>(r: &mut R) -> usize {
    1 + (r.get_uint() % (MAX_SLICE_LENGTH as u64 - 1)) as usize
}

/// Types that can produce a structurally valid value with arbitrary content.
pub trait Random: Sized {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self;
}

macro_rules! impl_random {
    ($($t:ty => $get:ident),+ $(,)?) => {
        $(
            impl Random for $t {
                fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
                    r.$get()
                }
            }
        )+
    };
}

impl_random!(
    bool => get_bool,
    i8 => get_int8,
    i16 => get_int16,
    i32 => get_int32,
    i64 => get_int64,
    u8 => get_uint8,
    u16 => get_uint16,
    u32 => get_uint32,
    u64 => get_uint64,
    f32 => get_float32,
    f64 => get_float64,
);

impl Random for Bytes {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        let len = random_length(r);
        r.get_bytes(len)
    }
}

impl Random for String {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        let len = 1 + (r.get_uint() % (MAX_STRING_LENGTH as u64 - 1)) as usize;
        r.get_string(len)
    }
}

impl<T: Random> Random for Vec<T> {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        let len = random_length(r);
        (0..len).map(|_| T::random(r)).collect()
    }
}

impl<T: Random> Random for Box<T> {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        Box::new(T::random(r))
    }
}

#[cfg(feature = "rand")]
const STRING_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[cfg(feature = "rand")]
impl<G: rand::RngCore + ?Sized> RandSrc for G {
    fn get_bool(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }

    fn get_int8(&mut self) -> i8 {
        self.next_u32() as i8
    }

    fn get_int16(&mut self) -> i16 {
        self.next_u32() as i16
    }

    fn get_int32(&mut self) -> i32 {
        self.next_u32() as i32
    }

    fn get_int64(&mut self) -> i64 {
        self.next_u64() as i64
    }

    fn get_uint8(&mut self) -> u8 {
        self.next_u32() as u8
    }

    fn get_uint16(&mut self) -> u16 {
        self.next_u32() as u16
    }

    fn get_uint32(&mut self) -> u32 {
        self.next_u32()
    }

    fn get_uint64(&mut self) -> u64 {
        self.next_u64()
    }

    fn get_uint(&mut self) -> u64 {
        self.next_u64()
    }

    /// Uniform in `[0, 1)`, never NaN.
    fn get_float32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[0, 1)`, never NaN.
    fn get_float64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn get_string(&mut self, n: usize) -> String {
        (0..n)
            .map(|_| {
                let idx = self.next_u32() as usize % STRING_CHARSET.len();
                STRING_CHARSET[idx] as char
            })
            .collect()
    }

    fn get_bytes(&mut self, n: usize) -> Bytes {
        let mut buf = vec![0u8; n];
        self.fill_bytes(&mut buf);
        Bytes::from(buf)
    }
}
