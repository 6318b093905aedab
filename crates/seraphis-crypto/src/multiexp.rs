//! Deferred multi-scalar multiplication for batch verification.
//!
//! Proof verifiers emit their check equations into builders instead of
//! evaluating them. Builders from any number of proofs and transactions are
//! merged into one vartime multiexp whose result must be the identity.
//! Scalars on the fixed generators and factory generators are accumulated in
//! place so each such base appears once in the final sum.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, VartimeMultiscalarMul};

use crate::{generators, random_scalar, CryptoError};

#[derive(Debug, Clone)]
pub struct SpMultiexpBuilder {
    weight: Scalar,
    g_scalar: Scalar,
    h_scalar: Scalar,
    u_scalar: Scalar,
    x_scalar: Scalar,
    generator_scalars: Vec<Scalar>,
    elements: Vec<(Scalar, EdwardsPoint)>,
}

impl SpMultiexpBuilder {
    /// `weight` multiplies every scalar added to this builder.
    pub fn new(weight: Scalar, num_generators: usize, num_elements: usize) -> Self {
        Self {
            weight,
            g_scalar: Scalar::ZERO,
            h_scalar: Scalar::ZERO,
            u_scalar: Scalar::ZERO,
            x_scalar: Scalar::ZERO,
            generator_scalars: vec![Scalar::ZERO; num_generators],
            elements: Vec::with_capacity(num_elements),
        }
    }

    /// Builder with a random nonzero weight, for independent batch members.
    pub fn with_random_weight(num_generators: usize, num_elements: usize) -> Self {
        let mut weight = random_scalar();
        while weight == Scalar::ZERO {
            weight = random_scalar();
        }
        Self::new(weight, num_generators, num_elements)
    }

    pub fn add_g_element(&mut self, scalar: Scalar) {
        self.g_scalar += self.weight * scalar;
    }

    pub fn add_h_element(&mut self, scalar: Scalar) {
        self.h_scalar += self.weight * scalar;
    }

    pub fn add_u_element(&mut self, scalar: Scalar) {
        self.u_scalar += self.weight * scalar;
    }

    pub fn add_x_element(&mut self, scalar: Scalar) {
        self.x_scalar += self.weight * scalar;
    }

    pub fn add_element_at_generator_index(&mut self, scalar: Scalar, index: usize) {
        if self.generator_scalars.len() <= index {
            self.generator_scalars.resize(index + 1, Scalar::ZERO);
        }
        self.generator_scalars[index] += self.weight * scalar;
    }

    pub fn add_element(&mut self, scalar: Scalar, point: EdwardsPoint) {
        self.elements.push((self.weight * scalar, point));
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len() + self.generator_scalars.len() + 4
    }
}

/// The evaluated sum of one or more builders.
#[derive(Debug, Clone, Copy)]
pub struct SpMultiexp {
    result: EdwardsPoint,
}

impl SpMultiexp {
    pub fn new(builders: &[SpMultiexpBuilder]) -> Result<Self, CryptoError> {
        let mut g_scalar = Scalar::ZERO;
        let mut h_scalar = Scalar::ZERO;
        let mut u_scalar = Scalar::ZERO;
        let mut x_scalar = Scalar::ZERO;
        let num_generators = builders
            .iter()
            .map(|b| b.generator_scalars.len())
            .max()
            .unwrap_or(0);
        let mut generator_scalars = vec![Scalar::ZERO; num_generators];
        let total_elements: usize = builders.iter().map(|b| b.elements.len()).sum();

        let mut scalars = Vec::with_capacity(total_elements + num_generators + 4);
        let mut points = Vec::with_capacity(total_elements + num_generators + 4);

        for builder in builders {
            g_scalar += builder.g_scalar;
            h_scalar += builder.h_scalar;
            u_scalar += builder.u_scalar;
            x_scalar += builder.x_scalar;
            for (acc, s) in generator_scalars.iter_mut().zip(&builder.generator_scalars) {
                *acc += s;
            }
            for (s, p) in &builder.elements {
                scalars.push(*s);
                points.push(*p);
            }
        }

        let factory = generators::factory_generators(num_generators)?;
        for (s, p) in generator_scalars.into_iter().zip(factory) {
            if s != Scalar::ZERO {
                scalars.push(s);
                points.push(p);
            }
        }

        for (s, p) in [
            (g_scalar, generators::g()),
            (h_scalar, generators::h()),
            (u_scalar, generators::u()),
            (x_scalar, generators::x()),
        ] {
            if s != Scalar::ZERO {
                scalars.push(s);
                points.push(p);
            }
        }

        Ok(Self {
            result: EdwardsPoint::vartime_multiscalar_mul(&scalars, &points),
        })
    }

    pub fn evaluates_to_point_at_infinity(&self) -> bool {
        self.result.is_identity()
    }

    pub fn result(&self) -> EdwardsPoint {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_builders_cancel() {
        let a = random_scalar();
        let p = EdwardsPoint::mul_base(&a);

        // a G - 1 * P == 0
        let mut builder = SpMultiexpBuilder::with_random_weight(0, 1);
        builder.add_g_element(a);
        builder.add_element(-Scalar::ONE, p);

        let mut other = SpMultiexpBuilder::with_random_weight(2, 1);
        let gen1 = generators::generator_at_index(1).unwrap();
        other.add_element_at_generator_index(Scalar::from(3u64), 1);
        other.add_element(-Scalar::from(3u64), gen1);

        let multiexp = SpMultiexp::new(&[builder, other]).unwrap();
        assert!(multiexp.evaluates_to_point_at_infinity());
    }

    #[test]
    fn test_unbalanced_builder_detected() {
        let mut builder = SpMultiexpBuilder::with_random_weight(0, 0);
        builder.add_u_element(Scalar::ONE);
        builder.add_x_element(-Scalar::ONE);
        assert!(!SpMultiexp::new(&[builder]).unwrap().evaluates_to_point_at_infinity());
    }

    #[test]
    fn test_empty_multiexp_is_identity() {
        assert!(SpMultiexp::new(&[]).unwrap().evaluates_to_point_at_infinity());
    }
}
