//! Default generator and entry point function.

use std::sync::OnceLock;
use std::time;

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use crate::{Generator, Uuid};

/// Returns the process-wide generator, creating one upon first use with a
/// random source seeded from the current time.
fn global_gen() -> &'static Generator<ChaCha12Rng> {
    static G: OnceLock<Generator<ChaCha12Rng>> = OnceLock::new();
    G.get_or_init(|| {
        let seed = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .expect("clock may have gone backwards")
            .as_micros() as u64;
        Generator::new(ChaCha12Rng::seed_from_u64(seed))
    })
}

/// Generates a [`Version::V2`](crate::Version::V2) identifier.
///
/// This function employs a process-wide generator; concurrent callers
/// receive distinct rotation counter values, so identifiers requested within
/// the same microsecond still carry distinct order keys until the counter
/// wraps.
///
/// # Examples
///
/// ```rust
/// let id = uuid200::uuid200();
/// println!("{}", id); // e.g., "AEDLFJ47FgDi0JpLedOp/E2DpwmcTJShpg=="
/// println!("{:?}", id.as_bytes()); // as 25-byte array
///
/// let id_string: String = uuid200::uuid200().to_string();
/// ```
pub fn uuid200() -> Uuid {
    global_gen().generate()
}
