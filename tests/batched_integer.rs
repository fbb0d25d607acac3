use std::sync::Arc;

use lattice_he::{
    CoeffModulus, Decryptor, Encoder, Encryptor, KeyGenerator, ParameterSet, PlainModulus,
    SchemeKind, SlotInput, Slots,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const T: u64 = 786433;

fn params() -> Arc<ParameterSet> {
    ParameterSet::builder(SchemeKind::BatchedInteger)
        .degree(4096)
        .coeff_modulus(CoeffModulus::Default)
        .plain_modulus(PlainModulus::Explicit(T))
        .build()
        .unwrap()
}

#[test]
fn counting_vector_roundtrips_exactly() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();

    let encoder = Encoder::new(params.clone()).unwrap();
    let values: Vec<u64> = (0..4096).map(|i| i % T).collect();
    let plaintext = encoder.encode(SlotInput::Integers(&values)).unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();

    let decryption = Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap();
    assert!(decryption.noise_budget > 0);
    assert!(decryption.is_trustworthy());
    let decoded = encoder.decode(&decryption.into_checked().unwrap()).unwrap();
    assert_eq!(decoded, Slots::Integers(values));
}

#[test]
fn encryption_is_randomized() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let encoder = Encoder::new(params).unwrap();
    let values: Vec<u64> = (0..4096).map(|i| (i * i) % T).collect();
    let plaintext = encoder.encode(SlotInput::Integers(&values)).unwrap();

    let encryptor = Encryptor::asymmetric(&public_key);
    let first = encryptor.encrypt(&plaintext, &mut rng).unwrap();
    let second = encryptor.encrypt(&plaintext, &mut rng).unwrap();
    assert_ne!(first.c0().channels(), second.c0().channels());
    assert_ne!(first.c1().channels(), second.c1().channels());

    let decryptor = Decryptor::new(&secret_key);
    for ciphertext in [&first, &second] {
        let decrypted = decryptor.decrypt(ciphertext).unwrap().plaintext;
        assert_eq!(decrypted, plaintext);
    }
}

#[test]
fn signed_values_and_symmetric_encryption() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let secret_key = KeyGenerator::new(params.clone())
        .generate_secret_key(&mut rng)
        .unwrap();
    let encoder = Encoder::new(params.clone()).unwrap();
    let values: Vec<i64> = (0..4096).map(|i| (i as i64 - 2048) * 97).collect();
    let plaintext = encoder.encode(SlotInput::Signed(&values)).unwrap();
    let ciphertext = Encryptor::symmetric(&secret_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();

    let decryption = Decryptor::new(&secret_key).decrypt(&ciphertext).unwrap();
    let batch = lattice_he::BatchEncoder::new(params).unwrap();
    assert_eq!(batch.decode_signed(&decryption.plaintext).unwrap(), values);
}

#[test]
fn fresh_budget_is_roughly_half_the_modulus() {
    let params = params();
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let encoder = Encoder::new(params).unwrap();
    let plaintext = encoder.encode(SlotInput::Integers(&[1; 4096])).unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    let budget = Decryptor::new(&secret_key)
        .invariant_noise_budget(&ciphertext)
        .unwrap();
    assert!((60..=90).contains(&budget), "budget {budget}");
}

#[test]
fn decrypting_with_another_parameter_set_fails() {
    let params = params();
    let other = ParameterSet::builder(SchemeKind::BatchedInteger)
        .degree(4096)
        .coeff_modulus(CoeffModulus::Default)
        .plain_modulus(PlainModulus::Explicit(40961))
        .build()
        .unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let (_, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let foreign_key = KeyGenerator::new(other.clone())
        .generate_secret_key(&mut rng)
        .unwrap();

    let plaintext = Encoder::new(params.clone())
        .unwrap()
        .encode(SlotInput::Integers(&[0; 4096]))
        .unwrap();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    let err = Decryptor::new(&foreign_key).decrypt(&ciphertext).unwrap_err();
    assert_eq!(err.expected, other.fingerprint());
    assert_eq!(err.found, params.fingerprint());
}
