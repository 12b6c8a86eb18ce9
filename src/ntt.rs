//! Number Theoretic Transform (NTT) for negacyclic convolution.
//!
//! Uses the "pre-multiply by ψ^i" approach:
//! 1. Multiply a[i] by ψ^i (converts negacyclic to cyclic)
//! 2. Standard radix-2 DIT NTT using ω = ψ² (N-th root of unity)
//! 3. Pointwise multiply
//! 4. Standard INTT using ω⁻¹
//! 5. Multiply result[i] by ψ^{-i} and scale by N⁻¹
//!
//! so `multiply(a, b)` is the product in Z_q[X]/(X^N+1).

use crate::arith::{addmod, bit_reverse, invmod, mulmod, powmod, submod};
use crate::error::{BfvError, Result};

/// NTT engine for Z_q[X]/(X^N+1).
///
/// Owns the modulus, the primitive 2N-th root ψ, and the precomputed twist
/// tables. Immutable after construction; operations never mutate caller
/// inputs except the explicit in-place `forward`/`inverse` working slices.
#[derive(Clone, Debug)]
pub struct Ntt {
    n: usize,
    q: i64,
    psi: i64,
    psi_inv: i64,
    omega: i64,     // ψ² = primitive N-th root of unity
    omega_inv: i64, // ω⁻¹ mod q
    n_inv: i64,     // N⁻¹ mod q
    // Precomputed: psi_pow[i] = ψ^i, psi_inv_pow[i] = ψ^{-i}, i = 0..N-1
    psi_pow: Vec<i64>,
    psi_inv_pow: Vec<i64>,
}

impl Ntt {
    /// Build an engine for degree `n` and modulus `q`.
    ///
    /// Requires n a power of two (n ≥ 2) and q ≡ 1 (mod 2n); the primitive
    /// root search then cannot fail for a prime q.
    pub fn new(n: usize, q: i64) -> Result<Self> {
        validate_params(n, q)?;
        let psi = find_psi(n, q)?;
        Self::from_root(n, q, psi)
    }

    /// Build an engine from a caller-supplied primitive 2N-th root,
    /// skipping the generator search. Intended for production-size primes
    /// where the linear search is too slow; the root is still validated.
    pub fn with_root(n: usize, q: i64, psi: i64) -> Result<Self> {
        validate_params(n, q)?;
        let psi = psi.rem_euclid(q);
        if powmod(psi, 2 * n as u64, q) != 1 || powmod(psi, n as u64, q) == 1 {
            return Err(BfvError::InvalidParameter(format!(
                "{} is not a primitive {}-th root of unity modulo {}",
                psi,
                2 * n,
                q
            )));
        }
        Self::from_root(n, q, psi)
    }

    fn from_root(n: usize, q: i64, psi: i64) -> Result<Self> {
        let psi_inv = invmod(psi, q)?;
        let omega = mulmod(psi, psi, q);
        let omega_inv = invmod(omega, q)?;
        let n_inv = invmod(n as i64, q)?;

        let mut psi_pow = vec![0i64; n];
        let mut psi_inv_pow = vec![0i64; n];
        psi_pow[0] = 1;
        psi_inv_pow[0] = 1;
        for i in 1..n {
            psi_pow[i] = mulmod(psi_pow[i - 1], psi, q);
            psi_inv_pow[i] = mulmod(psi_inv_pow[i - 1], psi_inv, q);
        }

        Ok(Ntt {
            n,
            q,
            psi,
            psi_inv,
            omega,
            omega_inv,
            n_inv,
            psi_pow,
            psi_inv_pow,
        })
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.n
    }

    /// Coefficient modulus q.
    pub fn modulus(&self) -> i64 {
        self.q
    }

    /// The primitive 2N-th root of unity ψ.
    pub fn psi(&self) -> i64 {
        self.psi
    }

    /// True iff construction derived a usable root and inverses.
    pub fn is_valid(&self) -> bool {
        self.psi != 0 && self.psi_inv != 0 && self.n_inv != 0
    }

    fn check_len(&self, a: &[i64]) -> Result<()> {
        if a.len() != self.n {
            return Err(BfvError::ShapeMismatch {
                expected: self.n,
                got: a.len(),
            });
        }
        Ok(())
    }

    /// Forward negacyclic NTT, in place on a caller-owned working slice.
    ///
    /// Coefficients may arrive anywhere in (-q, q); the twist multiply
    /// canonicalises them into [0, q).
    pub fn forward(&self, a: &mut [i64]) -> Result<()> {
        self.check_len(a)?;
        let q = self.q;
        // Pre-multiply by ψ^i (converts negacyclic to cyclic)
        for i in 0..self.n {
            a[i] = mulmod(a[i], self.psi_pow[i], q);
        }
        self.dit_cyclic(a, self.omega);
        Ok(())
    }

    /// Inverse negacyclic NTT, in place.
    pub fn inverse(&self, a: &mut [i64]) -> Result<()> {
        self.check_len(a)?;
        let q = self.q;
        self.dit_cyclic(a, self.omega_inv);
        // Scale by N⁻¹ and post-multiply by ψ^{-i}
        for i in 0..self.n {
            a[i] = mulmod(mulmod(a[i], self.n_inv, q), self.psi_inv_pow[i], q);
        }
        Ok(())
    }

    /// Radix-2 decimation-in-time butterflies for the cyclic transform,
    /// parameterised by the stage root (ω forward, ω⁻¹ inverse).
    fn dit_cyclic(&self, a: &mut [i64], omega: i64) {
        let n = self.n;
        let q = self.q;
        let log_n = n.trailing_zeros() as usize;

        // Bit-reverse permutation
        for i in 0..n {
            let j = bit_reverse(i, log_n);
            if i < j {
                a.swap(i, j);
            }
        }

        // Butterfly stages; ω^j is tracked incrementally per block.
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let step = (n / len) as u64;
            let omega_step = powmod(omega, step, q);
            for start in (0..n).step_by(len) {
                let mut w = 1i64;
                for j in 0..half {
                    let u = a[start + j];
                    let v = mulmod(a[start + j + half], w, q);
                    a[start + j] = addmod(u, v, q);
                    a[start + j + half] = submod(u, v, q);
                    w = mulmod(w, omega_step, q);
                }
            }
            len *= 2;
        }
    }

    /// Negacyclic product of two coefficient-domain polynomials.
    pub fn multiply(&self, a: &[i64], b: &[i64]) -> Result<Vec<i64>> {
        self.check_len(a)?;
        self.check_len(b)?;
        let mut fa = a.to_vec();
        let mut fb = b.to_vec();
        self.forward(&mut fa)?;
        self.forward(&mut fb)?;
        let mut c: Vec<i64> = fa
            .iter()
            .zip(fb.iter())
            .map(|(&x, &y)| mulmod(x, y, self.q))
            .collect();
        self.inverse(&mut c)?;
        Ok(c)
    }

    /// Element-wise addition mod q.
    pub fn add(&self, a: &[i64], b: &[i64]) -> Result<Vec<i64>> {
        self.check_len(a)?;
        self.check_len(b)?;
        Ok(a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| addmod(x, y, self.q))
            .collect())
    }

    /// Element-wise subtraction mod q.
    pub fn subtract(&self, a: &[i64], b: &[i64]) -> Result<Vec<i64>> {
        self.check_len(a)?;
        self.check_len(b)?;
        Ok(a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| submod(x, y, self.q))
            .collect())
    }

    /// Each coefficient times s, mod q.
    pub fn scalar_mul(&self, a: &[i64], s: i64) -> Result<Vec<i64>> {
        self.check_len(a)?;
        Ok(a.iter().map(|&x| mulmod(x, s, self.q)).collect())
    }
}

fn validate_params(n: usize, q: i64) -> Result<()> {
    if n < 2 || !n.is_power_of_two() {
        return Err(BfvError::InvalidParameter(format!(
            "degree {} must be a power of two, at least 2",
            n
        )));
    }
    if q < 2 || (q - 1) % (2 * n as i64) != 0 {
        return Err(BfvError::InvalidParameter(format!(
            "modulus {} must satisfy q ≡ 1 (mod {})",
            q,
            2 * n
        )));
    }
    Ok(())
}

/// Find a primitive 2N-th root of unity modulo q.
///
/// Iterates candidate generators g = 2, 3, …; v = g^((q-1)/(2N)) is
/// accepted iff v^(2N) ≡ 1 and v^N ≢ 1.
fn find_psi(n: usize, q: i64) -> Result<i64> {
    let two_n = 2 * n as u64;
    let exp = (q as u64 - 1) / two_n;
    let mut g = 2i64;
    while g < q {
        let v = powmod(g, exp, q);
        if powmod(v, two_n, q) == 1 && powmod(v, n as u64, q) != 1 {
            return Ok(v);
        }
        g += 1;
    }
    Err(BfvError::InitializationFailed { q })
}
