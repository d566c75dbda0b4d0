//! Demo transaction text and proof-of-work strings.

use crate::crypto::sha256_hex;
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Don", "Donna", "Dwayne", "Dan", "Jen", "Peter", "Andrew", "Zack", "Jake", "Tom", "Mike", "Sally", "Amanada",
    "Grace",
];

const SURNAMES: &[&str] = &[
    "Meyers", "Gunn", "White", "Blackman", "Cook", "Jeffers", "Jefferson", "Thomas", "Pidcock", "Greenman", "Sanders",
    "Whitehead",
];

/// A random "First Last" name pair.
pub fn random_phrase<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Both lists are non-empty constants.
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or_default();
    let last = SURNAMES.choose(rng).copied().unwrap_or_default();
    format!("{} {}", first, last)
}

/// An opaque proof-of-work label derived from the current time.
pub fn demo_proof_of_work() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let digest = sha256_hex(nanos.to_string().as_bytes());
    format!("BC-{}", &digest[..32])
}
