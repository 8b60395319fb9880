use std::sync::Arc;

use approx::assert_relative_eq;
use mm_kernel::{
    matmul, BoundKernel, KernelConfig, KernelError, KernelVariant, MatmulDims, MatmulKernel,
    Matrix, ReferenceKernel, RowParallelKernel,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_vec(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.gen::<f32>()).collect()
}

/// The reference kernel, row-parallel kernels with the default split, and
/// row-parallel kernels that band every problem with at least two rows.
fn kernels() -> Vec<Arc<dyn MatmulKernel>> {
    let mut kernels: Vec<Arc<dyn MatmulKernel>> = vec![
        Arc::new(ReferenceKernel::new()),
        Arc::new(RowParallelKernel::new(1)),
    ];
    for threads in [2, 3, 8] {
        kernels.push(Arc::new(RowParallelKernel::new(threads)));
        kernels.push(Arc::new(RowParallelKernel::new(threads).with_split(0, 1)));
    }
    kernels
}

fn bits(v: &[f32]) -> Vec<u32> {
    v.iter().map(|x| x.to_bits()).collect()
}

// ============================================================
// Known values
// ============================================================

#[test]
fn test_2x2_known_values() {
    init_logging();
    for kernel in kernels() {
        let c = kernel
            .matmul(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], MatmulDims::square(2))
            .unwrap();
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0], "{}", kernel.name());
    }
}

#[test]
fn test_2x3_times_3x2() {
    init_logging();
    let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
    let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0]; // 3x2
    for kernel in kernels() {
        let c = kernel.matmul(&a, &b, MatmulDims::new(2, 2, 3)).unwrap();
        assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0], "{}", kernel.name());
    }
}

#[test]
fn test_identity_left_returns_b() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 2, 5, 20, 64] {
        let a = Matrix::identity(n).unwrap();
        let b = Matrix::new(random_vec(&mut rng, n * n), n, n).unwrap();
        for kernel in kernels() {
            let c = a.matmul(&b, kernel.as_ref()).unwrap();
            assert_eq!(c.as_slice(), b.as_slice(), "n={} {}", n, kernel.name());
        }
    }
}

// ============================================================
// Edge dimensions
// ============================================================

#[test]
fn test_k_zero_produces_exact_zeros() {
    init_logging();
    for (m, n) in [(1, 1), (3, 5), (40, 70)] {
        for kernel in kernels() {
            let mut c = vec![f32::NAN; m * n];
            kernel
                .matmul_into(&[], &[], &mut c, MatmulDims::new(m, n, 0))
                .unwrap();
            assert!(c.iter().all(|v| v.to_bits() == 0), "{}x{} {}", m, n, kernel.name());
        }
    }
}

#[test]
fn test_m_or_n_zero_leaves_output_untouched() {
    init_logging();
    for kernel in kernels() {
        let mut c = vec![42.0f32; 6];
        kernel
            .matmul_into(&[], &[1.0; 12], &mut c, MatmulDims::new(0, 3, 4))
            .unwrap();
        kernel
            .matmul_into(&[1.0; 12], &[], &mut c, MatmulDims::new(3, 0, 4))
            .unwrap();
        assert_eq!(c, vec![42.0; 6], "{}", kernel.name());
    }
}

#[test]
fn test_small_odd_sizes_match_raw_loop() {
    let test_sizes = [(3, 3, 3), (5, 5, 5), (7, 7, 7), (3, 5, 7), (7, 3, 5), (11, 13, 17)];
    for (m, n, k) in test_sizes {
        let a: Vec<f32> = (0..m * k).map(|i| (i % 10) as f32).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 10) as f32).collect();

        let mut expected = vec![0.0f32; m * n];
        matmul(&a, &b, &mut expected, m, n, k);

        for kernel in kernels() {
            let got = kernel.matmul(&a, &b, MatmulDims::new(m, n, k)).unwrap();
            assert_eq!(got, expected, "{}x{}x{} {}", m, n, k, kernel.name());
        }
    }
}

#[test]
fn test_above_split_threshold_bit_identical() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    // Above the default FLOP threshold, with band sizes that do not divide m.
    for (m, n, k) in [(161, 101, 64), (97, 40, 300), (50, 70, 300)] {
        let dims = MatmulDims::new(m, n, k);
        let a = random_vec(&mut rng, m * k);
        let b = random_vec(&mut rng, k * n);
        let expected = ReferenceKernel::new().matmul(&a, &b, dims).unwrap();
        for kernel in kernels() {
            let mut c = vec![f32::NAN; m * n + 5];
            kernel.matmul_into(&a, &b, &mut c, dims).unwrap();
            assert_eq!(bits(&c[..m * n]), bits(&expected), "{} {}", dims, kernel.name());
            assert!(c[m * n..].iter().all(|v| v.is_nan()), "{} {}", dims, kernel.name());
        }
    }
}

// ============================================================
// Output isolation
// ============================================================

#[test]
fn test_second_call_overwrites_every_element() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(11);
    let dims = MatmulDims::new(9, 13, 6);
    let sentinel = -12345.0f32;
    for kernel in kernels() {
        let mut c = vec![0.0f32; dims.c_len().unwrap()];
        let a1 = random_vec(&mut rng, dims.a_len().unwrap());
        let b1 = random_vec(&mut rng, dims.b_len().unwrap());
        kernel.matmul_into(&a1, &b1, &mut c, dims).unwrap();

        c.iter_mut().for_each(|v| *v = sentinel);
        let a2 = random_vec(&mut rng, dims.a_len().unwrap());
        let b2 = random_vec(&mut rng, dims.b_len().unwrap());
        kernel.matmul_into(&a2, &b2, &mut c, dims).unwrap();

        assert!(c.iter().all(|&v| v != sentinel), "{}", kernel.name());
        assert_eq!(c, ReferenceKernel::new().matmul(&a2, &b2, dims).unwrap());
    }
}

#[test]
fn test_tail_of_oversized_output_untouched() {
    let dims = MatmulDims::new(2, 2, 2);
    for kernel in kernels() {
        let mut c = vec![-1.0f32; 7];
        kernel
            .matmul_into(&[1.0; 4], &[1.0; 4], &mut c, dims)
            .unwrap();
        assert_eq!(&c[..4], &[2.0; 4]);
        assert_eq!(&c[4..], &[-1.0; 3]);
    }
}

// ============================================================
// Precision and special values
// ============================================================

#[test]
fn test_accumulation_is_single_precision() {
    // An f64 accumulator would return 1.0 here.
    let a = [1.0e8f32, 1.0, -1.0e8];
    let b = [1.0f32, 1.0, 1.0];
    for kernel in kernels() {
        let c = kernel.matmul(&a, &b, MatmulDims::new(1, 1, 3)).unwrap();
        assert_eq!(c, vec![0.0], "{}", kernel.name());
    }
}

#[test]
fn test_special_values_propagate() {
    let a = [f32::NAN, 1.0, f32::INFINITY, 1.0, f32::INFINITY, f32::NEG_INFINITY];
    let b = [1.0f32, 1.0];
    for kernel in kernels() {
        let c = kernel.matmul(&a, &b, MatmulDims::new(3, 1, 2)).unwrap();
        assert!(c[0].is_nan());
        assert_eq!(c[1], f32::INFINITY);
        // inf + -inf
        assert!(c[2].is_nan());
    }
}

#[test]
fn test_large_random_close_to_f64() {
    let mut rng = StdRng::seed_from_u64(7);
    let (m, n, k) = (20, 20, 20);
    let a = random_vec(&mut rng, m * k);
    let b = random_vec(&mut rng, k * n);
    let c = ReferenceKernel::new()
        .matmul(&a, &b, MatmulDims::new(m, n, k))
        .unwrap();
    for i in 0..m {
        for j in 0..n {
            let exact: f64 = (0..k)
                .map(|p| a[i * k + p] as f64 * b[p * n + j] as f64)
                .sum();
            assert_relative_eq!(c[i * n + j] as f64, exact, max_relative = 1e-5);
        }
    }
}

// ============================================================
// Errors, bound kernels, config
// ============================================================

#[test]
fn test_short_buffers_rejected_without_writes() {
    let dims = MatmulDims::new(3, 3, 3);
    for kernel in kernels() {
        let mut c = vec![8.0f32; 9];
        let err = kernel
            .matmul_into(&[1.0; 8], &[1.0; 9], &mut c, dims)
            .unwrap_err();
        assert_eq!(
            err,
            KernelError::BufferTooShort {
                buffer: "A",
                required: 9,
                got: 8
            }
        );
        assert_eq!(c, vec![8.0; 9]);
    }
}

#[test]
fn test_bound_kernel_from_config() {
    init_logging();
    let config = KernelConfig {
        variant: KernelVariant::RowParallel,
        max_threads: 2,
    };
    let bound = BoundKernel::new(MatmulDims::new(2, 2, 3), config.build()).unwrap();
    let mut c = vec![0.0f32; 4];
    bound
        .invoke(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            &mut c,
        )
        .unwrap();
    assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0]);
}
