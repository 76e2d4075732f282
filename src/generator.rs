//! Identifier generators.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time;

use rand::RngCore;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::bits;
use crate::{Uuid, Version};

const MAX_59BIT: u64 = (1 << 59) - 1;
const MAX_60BIT: u64 = (1 << 60) - 1;
const MAX_14BIT: u32 = (1 << 14) - 1;

/// Produces 200-bit identifiers in one of the two layout versions, fixed at
/// construction time.
///
/// Each [`generate`] call reads the clock once, takes the next rotation
/// counter value with an atomic increment, draws the version's random fields,
/// and assembles the result through the bit-region codec. The counter uses
/// its low 12 bits only: after 4096 identifiers within one microsecond it
/// silently wraps, and uniqueness rests on the random payload alone.
///
/// The counter is lock-free and the random source sits behind a mutex, so a
/// generator may be shared across threads:
///
/// ```rust
/// use rand::rngs::OsRng;
/// use std::{sync, thread};
/// use uuid200::Generator;
///
/// let g = sync::Arc::new(Generator::new(OsRng));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// [`generate`]: Generator::generate
#[derive(Debug)]
pub struct Generator<R> {
    rotation: AtomicU32,
    prefix: Option<u16>,

    /// The random number generator used by the generator.
    rng: Mutex<R>,
}

impl<R: RngCore> Generator<R> {
    /// Creates a generator producing [`Version::V2`] identifiers, whose
    /// 134-bit payload is entirely random.
    pub fn new(rng: R) -> Self {
        Self {
            rotation: AtomicU32::new(0),
            prefix: None,
            rng: Mutex::new(rng),
        }
    }

    /// Creates a generator producing [`Version::V1`] identifiers carrying
    /// `prefix` as the 16-bit site mark, for deployments where multiple
    /// machines or processes generate identifiers side by side.
    pub fn with_prefix(prefix: u16, rng: R) -> Self {
        Self {
            rotation: AtomicU32::new(0),
            prefix: Some(prefix),
            rng: Mutex::new(rng),
        }
    }

    /// Returns the layout version this generator stamps into every
    /// identifier.
    pub fn version(&self) -> Version {
        match self.prefix {
            Some(_) => Version::V1,
            None => Version::V2,
        }
    }

    /// Generates a new identifier from the current timestamp.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Uuid {
        self.generate_core(
            time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_micros() as u64,
        )
    }

    /// Generates a new identifier from the given microsecond timestamp.
    ///
    /// Only the low 52 bits of `unix_ts_us` are stored; wider values are a
    /// contract violation on the caller's side and are truncated, not
    /// detected. Counting from the Unix epoch, 52 bits last until the 22nd
    /// century.
    pub fn generate_core(&self, unix_ts_us: u64) -> Uuid {
        let counter = self.rotation.fetch_add(1, Ordering::Relaxed).wrapping_add(1) as u16;

        let mut bytes = [0u8; 25];
        put(&mut bytes, 0, 52, &unix_ts_us.to_le_bytes());
        put(&mut bytes, 52, 64, &counter.to_le_bytes());

        let mut rng = self
            .rng
            .lock()
            .expect("uuid200: could not lock the random source");
        match self.prefix {
            Some(prefix) => {
                put(&mut bytes, 64, 66, &[Version::V1 as u8]);
                put(&mut bytes, 66, 82, &prefix.to_le_bytes());
                // 118 random bits, drawn as two 59-bit values
                put(&mut bytes, 82, 141, &(rng.next_u64() & MAX_59BIT).to_le_bytes());
                put(&mut bytes, 141, 200, &(rng.next_u64() & MAX_59BIT).to_le_bytes());
            }
            None => {
                put(&mut bytes, 64, 66, &[Version::V2 as u8]);
                // 134 random bits, drawn as 60 + 60 + 14
                put(&mut bytes, 66, 126, &(rng.next_u64() & MAX_60BIT).to_le_bytes());
                put(&mut bytes, 126, 186, &(rng.next_u64() & MAX_60BIT).to_le_bytes());
                let tail = (rng.next_u32() & MAX_14BIT) as u16;
                put(&mut bytes, 186, 200, &tail.to_le_bytes());
            }
        }

        Uuid::from(bytes)
    }
}

/// Merges one field into the identifier buffer; every call site passes a
/// range inside the 200-bit layout.
fn put(bytes: &mut [u8; 25], start: usize, end: usize, data: &[u8]) {
    bits::write_bits(bytes, start, end, data).expect("field range within the 200-bit layout");
}

/// Supports operations as an infinite iterator that produces a new
/// identifier for each call of `next()`.
///
/// # Examples
///
/// ```rust
/// use uuid200::Generator;
///
/// Generator::new(rand::thread_rng())
///     .take(4)
///     .for_each(|e| println!("{}", e));
/// ```
impl<R: RngCore> Iterator for Generator<R> {
    type Item = Uuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RngCore> std::iter::FusedIterator for Generator<R> {}
