//! BFV ciphertext multiplication over Z_q[X]/(X^N+1).
//!
//! The computational core of a homomorphic-encryption accelerator: a
//! negacyclic Number-Theoretic Transform over a prime-modulus ring, and the
//! BFV tensor / rescale / relinearize pipeline built on top of it. Key
//! generation, encryption and decryption belong to the caller; this crate
//! only ever sees polynomial coefficient vectors and a borrowed
//! relinearization key.
//!
//! # ⚠️ WARNING: NOT PRODUCTION READY ⚠️
//!
//! This is a research prototype. NOT audited, NOT constant-time,
//! NOT safe against side-channel attacks.

pub mod arith;
pub mod bfv;
pub mod error;
pub mod ntt;
