//! Elementwise arithmetic scenarios

#[cfg(test)]
mod tests {
    use matriz_core::{MatError, MatOps};
    use matriz_cpu::Matrix;

    use crate::utils::{mats_eq, patterned, ramp_pair};

    #[test]
    fn test_ramp_sum_is_all_sixes() {
        let (a, b) = ramp_pair();
        let sum = &a + &b;
        assert!(sum.as_slice().unwrap().iter().all(|&v| v == 6.0));
    }

    #[test]
    fn test_ramp_hadamard_diagonal_profile() {
        let (a, b) = ramp_pair();
        let had = &a * &b;
        // Column products: 1*5, 2*4, 3*3, 4*2, 5*1, so the diagonal reads
        // [5, 8, 9, 8, 5].
        for (c, want) in [5.0, 8.0, 9.0, 8.0, 5.0].into_iter().enumerate() {
            for r in 0..5 {
                assert_eq!(had.get(r, c).unwrap(), want);
            }
            assert_eq!(had.get(c, c).unwrap(), want);
        }
    }

    #[test]
    fn test_add_zero_is_identity() {
        let (_, b) = ramp_pair();
        let zeros = Matrix::zeros(5, 5).unwrap();
        let sum = &zeros + &b;
        assert!(mats_eq(&sum, &b));
    }

    #[test]
    fn test_add_then_sub_round_trips() {
        let a = patterned(30, 41);
        let b = patterned(30, 41);
        let back = &(&a + &b) - &b;
        assert!(mats_eq(&back, &a));
    }

    #[test]
    fn test_scale_matches_elementwise() {
        let a = patterned(9, 13);
        let scaled = &a * 2.5;
        for r in 0..9 {
            for c in 0..13 {
                assert_eq!(scaled.get(r, c).unwrap(), a.get(r, c).unwrap() * 2.5);
            }
        }
        // Scalar on either side.
        assert!(mats_eq(&scaled, &(2.5 * &a)));
    }

    #[test]
    fn test_in_place_forms_match_operators() {
        let a = patterned(12, 12);
        let b = patterned(12, 12);

        let mut acc = a.duplicate().unwrap();
        acc.add_assign_mat(&b).unwrap();
        assert!(mats_eq(&acc, &(&a + &b)));

        acc.copy_from(&a).unwrap();
        acc.mul_assign_mat(&b).unwrap();
        assert!(mats_eq(&acc, &(&a * &b)));
    }

    #[test]
    fn test_mismatched_shapes_fail_cleanly() {
        let mut a = patterned(4, 6);
        let before = a.duplicate().unwrap();
        let b = patterned(6, 4);

        for result in [
            a.add_assign_mat(&b),
            a.sub_assign_mat(&b),
            a.mul_assign_mat(&b),
            a.copy_from(&b),
        ] {
            assert_eq!(
                result,
                Err(MatError::ShapeMismatch {
                    expected: (4, 6),
                    got: (6, 4)
                })
            );
        }
        assert!(mats_eq(&a, &before));
    }

    #[test]
    fn test_matrix_product_not_supported() {
        let mut a = patterned(3, 3);
        let b = patterned(3, 3);
        assert_eq!(
            a.product(&b),
            Err(MatError::NotImplemented("matrix product"))
        );
    }
}
