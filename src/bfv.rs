//! BFV ciphertext multiplication: tensor expansion, t/q rescaling and
//! single-key relinearization.
//!
//! A linear ciphertext decrypts as c₀ + c₁·s; the tensor product of two of
//! them decrypts under (1, s, s²), so after rescaling, `relinearize` folds
//! the s² term back via a key encrypting s².

use crate::error::{BfvError, Result};
use crate::ntt::Ntt;

/// A linear BFV ciphertext (c₀, c₁) in coefficient form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub c0: Vec<i64>,
    pub c1: Vec<i64>,
}

/// The three-term ciphertext produced by tensoring, prior to
/// relinearization. Decrypts under (1, s, s²).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedCiphertext {
    pub d0: Vec<i64>,
    pub d1: Vec<i64>,
    pub d2: Vec<i64>,
}

/// Relinearization key (rk₀, rk₁): an evaluation key encrypting s² under
/// the public key. Supplied and owned by the caller, borrowed per call and
/// treated opaquely; only its shape is checked.
#[derive(Clone, Debug)]
pub struct RelinKey {
    pub rk0: Vec<i64>,
    pub rk1: Vec<i64>,
}

/// BFV multiplier over Z_q[X]/(X^N+1) with plaintext modulus t.
pub struct BfvMultiplier {
    ntt: Ntt,
    n: usize,
    q: i64,
    t: i64,
    delta: i64, // floor(q/t)
}

impl BfvMultiplier {
    /// Build a multiplier for degree `n`, ciphertext modulus `q` and
    /// plaintext modulus `t`. Propagates the NTT engine's parameter checks
    /// and requires 0 < t ≤ q so that Δ = ⌊q/t⌋ ≥ 1.
    pub fn new(n: usize, q: i64, t: i64) -> Result<Self> {
        let ntt = Ntt::new(n, q)?;
        if !ntt.is_valid() {
            return Err(BfvError::InitializationFailed { q });
        }
        if t < 1 || t > q {
            return Err(BfvError::InvalidParameter(format!(
                "plaintext modulus {} must lie in 1..={}",
                t, q
            )));
        }
        let delta = q / t;
        Ok(BfvMultiplier { ntt, n, q, t, delta })
    }

    /// Δ = ⌊q/t⌋, the plaintext scaling factor.
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.n
    }

    /// Ciphertext modulus q.
    pub fn ciphertext_modulus(&self) -> i64 {
        self.q
    }

    /// Plaintext modulus t.
    pub fn plaintext_modulus(&self) -> i64 {
        self.t
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

    /// Multiply two linear ciphertexts into the three-term tensor form.
    ///
    /// d₀ = c1₀·c2₀, d₁ = c1₀·c2₁ + c1₁·c2₀, d₂ = c1₁·c2₁, each product
    /// negacyclic, each component then rescaled by t/q.
    pub fn multiply_ciphertexts(
        &self,
        ct1: &Ciphertext,
        ct2: &Ciphertext,
    ) -> Result<ExtendedCiphertext> {
        for p in [&ct1.c0, &ct1.c1, &ct2.c0, &ct2.c1] {
            self.check_len(p)?;
        }

        let d0 = self.ntt.multiply(&ct1.c0, &ct2.c0)?;
        let d1 = self.ntt.add(
            &self.ntt.multiply(&ct1.c0, &ct2.c1)?,
            &self.ntt.multiply(&ct1.c1, &ct2.c0)?,
        )?;
        let d2 = self.ntt.multiply(&ct1.c1, &ct2.c1)?;

        Ok(ExtendedCiphertext {
            d0: self.scale_down(&d0)?,
            d1: self.scale_down(&d1)?,
            d2: self.scale_down(&d2)?,
        })
    }

    /// Rescale a tensored component by t/q, rounding half up.
    ///
    /// Per coefficient: v = coeff·t in 128 bits; scaled = v div q, plus one
    /// when (v mod q)·2 ≥ q; canonicalised mod q. Euclidean div/mod keeps
    /// the rounding direction consistent for signed inputs.
    pub fn scale_down(&self, poly: &[i64]) -> Result<Vec<i64>> {
        self.check_len(poly)?;
        let q = self.q as i128;
        let t = self.t as i128;
        Ok(poly
            .iter()
            .map(|&coeff| {
                let v = coeff as i128 * t;
                let mut scaled = v.div_euclid(q);
                if v.rem_euclid(q) * 2 >= q {
                    scaled += 1;
                }
                scaled.rem_euclid(q) as i64
            })
            .collect())
    }

    /// Reduce (d₀, d₁, d₂) back to a linear ciphertext:
    /// c₀ = d₀ + d₂·rk₀, c₁ = d₁ + d₂·rk₁.
    pub fn relinearize(&self, ext: &ExtendedCiphertext, rk: &RelinKey) -> Result<Ciphertext> {
        for p in [&ext.d0, &ext.d1, &ext.d2] {
            self.check_len(p)?;
        }
        for p in [&rk.rk0, &rk.rk1] {
            if p.len() != self.n {
                return Err(BfvError::InvalidKey {
                    expected: self.n,
                    got: p.len(),
                });
            }
        }

        let c0 = self.ntt.add(&ext.d0, &self.ntt.multiply(&ext.d2, &rk.rk0)?)?;
        let c1 = self.ntt.add(&ext.d1, &self.ntt.multiply(&ext.d2, &rk.rk1)?)?;
        Ok(Ciphertext { c0, c1 })
    }

    /// Homomorphic addition: component-wise ring add.
    pub fn add_ciphertexts(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        Ok(Ciphertext {
            c0: self.ntt.add(&ct1.c0, &ct2.c0)?,
            c1: self.ntt.add(&ct1.c1, &ct2.c1)?,
        })
    }

    /// Homomorphic subtraction: ct1 - ct2, component-wise.
    pub fn sub_ciphertexts(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        Ok(Ciphertext {
            c0: self.ntt.subtract(&ct1.c0, &ct2.c0)?,
            c1: self.ntt.subtract(&ct1.c1, &ct2.c1)?,
        })
    }

    /// Homomorphic negation.
    pub fn negate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        Ok(Ciphertext {
            c0: self.ntt.scalar_mul(&ct.c0, self.q - 1)?,
            c1: self.ntt.scalar_mul(&ct.c1, self.q - 1)?,
        })
    }

    /// Multiply both components by a plaintext polynomial. Cheaper than a
    /// ciphertext-ciphertext product and needs no relinearization.
    pub fn multiply_plain(&self, ct: &Ciphertext, pt: &[i64]) -> Result<Ciphertext> {
        self.check_len(pt)?;
        Ok(Ciphertext {
            c0: self.ntt.multiply(&ct.c0, pt)?,
            c1: self.ntt.multiply(&ct.c1, pt)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mult() -> BfvMultiplier {
        BfvMultiplier::new(4, 17, 2).unwrap()
    }

    #[test]
    fn test_delta() {
        assert_eq!(mult().delta(), 8);
        assert_eq!(BfvMultiplier::new(4, 65537, 256).unwrap().delta(), 256);
    }

    #[test]
    fn test_scale_down_rounds_half_up() {
        let m = mult();
        // round(9·2/17) = 1, round(8·2/17) = 1, round(17·2/17) = 2
        assert_eq!(m.scale_down(&[9, 8, 17, 0]).unwrap(), vec![1, 1, 2, 0]);
    }

    #[test]
    fn test_relinearize_zero_key_is_identity() {
        let m = mult();
        let ext = ExtendedCiphertext {
            d0: vec![1, 2, 3, 4],
            d1: vec![5, 6, 7, 8],
            d2: vec![9, 10, 11, 12],
        };
        let rk = RelinKey {
            rk0: vec![0; 4],
            rk1: vec![0; 4],
        };
        let ct = m.relinearize(&ext, &rk).unwrap();
        assert_eq!(ct.c0, ext.d0);
        assert_eq!(ct.c1, ext.d1);
    }

    #[test]
    fn test_relinearize_rejects_malformed_key() {
        let m = mult();
        let ext = ExtendedCiphertext {
            d0: vec![0; 4],
            d1: vec![0; 4],
            d2: vec![0; 4],
        };
        let rk = RelinKey {
            rk0: vec![0; 3],
            rk1: vec![0; 4],
        };
        assert_eq!(
            m.relinearize(&ext, &rk),
            Err(BfvError::InvalidKey {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn test_rejects_bad_plaintext_modulus() {
        assert!(matches!(
            BfvMultiplier::new(4, 17, 0),
            Err(BfvError::InvalidParameter(_))
        ));
        assert!(matches!(
            BfvMultiplier::new(4, 17, 18),
            Err(BfvError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let m = mult();
        let good = Ciphertext {
            c0: vec![0; 4],
            c1: vec![0; 4],
        };
        let bad = Ciphertext {
            c0: vec![0; 4],
            c1: vec![0; 5],
        };
        assert!(matches!(
            m.multiply_ciphertexts(&good, &bad),
            Err(BfvError::ShapeMismatch { .. })
        ));
        assert!(m.scale_down(&[1, 2, 3]).is_err());
        assert!(m.multiply_plain(&good, &[1, 2]).is_err());
    }

    #[test]
    fn test_add_sub_negate_roundtrip() {
        let m = mult();
        let a = Ciphertext {
            c0: vec![1, 2, 3, 4],
            c1: vec![5, 6, 7, 8],
        };
        let b = Ciphertext {
            c0: vec![16, 1, 0, 9],
            c1: vec![2, 2, 2, 2],
        };
        let sum = m.add_ciphertexts(&a, &b).unwrap();
        let back = m.sub_ciphertexts(&sum, &b).unwrap();
        assert_eq!(back, a);

        let neg = m.negate(&a).unwrap();
        let zero = m.add_ciphertexts(&a, &neg).unwrap();
        assert_eq!(zero.c0, vec![0; 4]);
        assert_eq!(zero.c1, vec![0; 4]);
    }

    #[test]
    fn test_multiply_plain_by_one_is_identity() {
        let m = mult();
        let ct = Ciphertext {
            c0: vec![3, 1, 4, 1],
            c1: vec![5, 9, 2, 6],
        };
        let one = vec![1, 0, 0, 0];
        let out = m.multiply_plain(&ct, &one).unwrap();
        assert_eq!(out, ct);
    }
}
