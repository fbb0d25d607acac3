use std::sync::Arc;

use approx::assert_abs_diff_eq;
use lattice_he::{
    ApproxEncoder, Complex64, Decryptor, EncodeError, Encoder, Encryptor, KeyGenerator,
    ParameterSet, SchemeKind, SlotInput, Slots,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn params() -> Arc<ParameterSet> {
    ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
        .degree(4096)
        .build()
        .unwrap()
}

fn scale(params: &ParameterSet) -> f64 {
    let last = *params.coeff_modulus().last().unwrap();
    (last as f64).sqrt()
}

#[test]
fn scaled_ramp_decrypts_within_tolerance() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(4096);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();

    let encoder = Encoder::new(params.clone()).unwrap();
    let values: Vec<f64> = (0..2048).map(|i| 1.001 * i as f64).collect();
    let plaintext = encoder
        .encode(SlotInput::Real {
            values: &values,
            scale: scale(&params),
        })
        .unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    let decryption = Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap();
    assert!(decryption.noise_budget > 0);
    assert_eq!(decryption.plaintext.scale(), plaintext.scale());

    let Slots::Complex(decoded) = encoder.decode(&decryption.plaintext).unwrap() else {
        panic!("approximate encoder returns complex slots");
    };
    assert_eq!(decoded.len(), 2048);
    for (expected, got) in values.iter().zip(&decoded) {
        assert_abs_diff_eq!(got.re, *expected, epsilon = 0.5);
        assert_abs_diff_eq!(got.im, 0.0, epsilon = 0.5);
        if *expected >= 512.0 {
            assert!(((got.re - expected) / expected).abs() < 1e-3);
        }
    }
}

#[test]
fn larger_scale_gives_smaller_error() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let secret_key = KeyGenerator::new(params.clone())
        .generate_secret_key(&mut rng)
        .unwrap();
    let encoder = ApproxEncoder::new(params.clone()).unwrap();
    let values: Vec<f64> = (0..2048).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();

    let max_error = |scale: f64, rng: &mut ChaCha20Rng| {
        let plaintext = encoder.encode(&values, scale).unwrap();
        let ciphertext = Encryptor::symmetric(&secret_key)
            .encrypt(&plaintext, rng)
            .unwrap();
        let decrypted = Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap();
        encoder
            .decode(&decrypted.plaintext)
            .unwrap()
            .iter()
            .zip(&values)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max)
    };

    let coarse = max_error(2f64.powi(12), &mut rng);
    let fine = max_error(2f64.powi(40), &mut rng);
    assert!(fine < coarse);
    assert!(fine < 1e-6, "error {fine}");
}

#[test]
fn complex_slots_survive_encryption() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(77);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let encoder = ApproxEncoder::new(params.clone()).unwrap();
    let values: Vec<Complex64> = (0..100)
        .map(|i| Complex64::new(i as f64, 50.0 - i as f64))
        .collect();
    let plaintext = encoder.encode_complex(&values, 2f64.powi(30)).unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    let decrypted = Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap();
    let decoded = encoder.decode_complex(&decrypted.plaintext).unwrap();
    for (expected, got) in values.iter().zip(&decoded) {
        assert!((expected - got).norm() < 1e-3);
    }
    assert!(decoded[100..].iter().all(|z| z.norm() < 1e-3));
}

#[test]
fn lower_level_encryption_uses_fewer_primes() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let encoder = ApproxEncoder::new(params.clone()).unwrap();
    let plaintext = encoder.encode_at_level(&[3.5, -1.25], 2f64.powi(40), 1).unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    assert_eq!(ciphertext.level(), 1);
    assert_eq!(ciphertext.c0().channels().len(), 2);
    let decoded = encoder
        .decode(&Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap().plaintext)
        .unwrap();
    assert_abs_diff_eq!(decoded[0], 3.5, epsilon = 1e-6);
    assert_abs_diff_eq!(decoded[1], -1.25, epsilon = 1e-6);
}

#[test]
fn oversized_input_is_rejected() {
    let encoder = Encoder::new(params()).unwrap();
    let err = encoder
        .encode(SlotInput::Real {
            values: &vec![1.0; 2049],
            scale: 1024.0,
        })
        .unwrap_err();
    assert_eq!(err, EncodeError::TooManySlots { got: 2049, max: 2048 });
}
