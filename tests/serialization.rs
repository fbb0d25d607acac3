use std::sync::Arc;

use approx::assert_abs_diff_eq;
use lattice_he::{
    ApproxEncoder, Ciphertext, CoeffModulus, Decryptor, Encoder, Encryptor, FormatError,
    KeyGenerator, ParameterSet, PlainModulus, Plaintext, SchemeKind, SlotInput, Slots,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn timeline() -> Arc<ParameterSet> {
    ParameterSet::builder(SchemeKind::TimelineInteger)
        .degree(1024)
        .coeff_modulus(CoeffModulus::BitSizes(vec![40, 40]))
        .plain_modulus(PlainModulus::BatchingBits(17))
        .build()
        .unwrap()
}

fn approximate() -> Arc<ParameterSet> {
    ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
        .degree(1024)
        .coeff_modulus(CoeffModulus::BitSizes(vec![40, 40]))
        .build()
        .unwrap()
}

#[test]
fn plaintext_roundtrip_is_identity() {
    for params in [timeline(), approximate()] {
        let encoder = Encoder::new(params.clone()).unwrap();
        let plaintext = if params.scheme().is_integer() {
            let values: Vec<u64> = (0..1024).collect();
            encoder.encode(SlotInput::Integers(&values)).unwrap()
        } else {
            encoder
                .encode(SlotInput::Real {
                    values: &[0.5, -0.25, 8.0],
                    scale: 2f64.powi(20),
                })
                .unwrap()
        };
        let bytes = plaintext.export();
        assert_eq!(Plaintext::import(&bytes, &params).unwrap(), plaintext);
    }
}

#[test]
fn ciphertext_roundtrip_decrypts_identically() {
    let params = timeline();
    let mut rng = ChaCha20Rng::seed_from_u64(64);
    let (secret_key, public_key) = KeyGenerator::new(params.clone())
        .generate(&mut rng)
        .unwrap();
    let encoder = Encoder::new(params.clone()).unwrap();
    let values: Vec<u64> = (0..1024).map(|i| i * 3).collect();
    let ciphertext = Encryptor::asymmetric(&public_key)
        .encrypt(&encoder.encode(SlotInput::Integers(&values)).unwrap(), &mut rng)
        .unwrap();

    for ciphertext in [ciphertext.clone(), ciphertext.mod_switch_to_next(&params).unwrap()] {
        let restored = Ciphertext::import(&ciphertext.export(), &params).unwrap();
        assert_eq!(restored.level(), ciphertext.level());
        assert_eq!(restored.scale(), ciphertext.scale());
        assert_eq!(restored.c0().channels(), ciphertext.c0().channels());
        assert_eq!(restored.c1().channels(), ciphertext.c1().channels());

        let decrypted = Decryptor::new(&secret_key).decrypt(&restored).unwrap();
        assert_eq!(
            encoder.decode(&decrypted.plaintext).unwrap(),
            Slots::Integers(values.clone())
        );
    }
}

#[test]
fn approximate_ciphertext_below_top_level_roundtrips() {
    let params = approximate();
    let mut rng = ChaCha20Rng::seed_from_u64(65);
    let secret_key = KeyGenerator::new(params.clone())
        .generate_secret_key(&mut rng)
        .unwrap();
    let encoder = ApproxEncoder::new(params.clone()).unwrap();
    let values = [1.5, -0.75, 3.0, 0.125];
    let scale = 2f64.powi(16);
    let plaintext = encoder.encode_at_level(&values, scale, 0).unwrap();
    let ciphertext = Encryptor::symmetric(&secret_key)
        .encrypt(&plaintext, &mut rng)
        .unwrap();
    assert_eq!(params.max_level(), 1);
    assert_eq!(ciphertext.level(), 0);

    let bytes = ciphertext.export();
    let restored = Ciphertext::import(&bytes, &params).unwrap();
    assert_eq!(restored.fingerprint(), ciphertext.fingerprint());
    assert_eq!(restored.level(), 0);
    assert_eq!(restored.scale(), scale);
    assert_eq!(restored.c0().channels(), ciphertext.c0().channels());
    assert_eq!(restored.c1().channels(), ciphertext.c1().channels());
    assert_eq!(restored.export(), bytes);

    let decrypted = Decryptor::new(&secret_key).decrypt(&restored).unwrap();
    assert_eq!(decrypted.plaintext.scale(), scale);
    let decoded = encoder.decode(&decrypted.plaintext).unwrap();
    for (expected, got) in values.iter().zip(&decoded) {
        assert_abs_diff_eq!(*got, *expected, epsilon = 0.05);
    }
}

#[test]
fn import_rejects_foreign_parameters() {
    let params = timeline();
    let plaintext = Encoder::new(params.clone())
        .unwrap()
        .encode(SlotInput::Integers(&[1; 1024]))
        .unwrap();
    let err = Plaintext::import(&plaintext.export(), &approximate()).unwrap_err();
    assert!(matches!(err, FormatError::ParameterMismatch(_)));
}

#[test]
fn import_rejects_malformed_buffers() {
    let params = approximate();
    let plaintext = Encoder::new(params.clone())
        .unwrap()
        .encode(SlotInput::Real {
            values: &[1.0],
            scale: 1024.0,
        })
        .unwrap();
    let bytes = plaintext.export();

    assert!(matches!(
        Plaintext::import(&bytes[..20], &params),
        Err(FormatError::Truncated { .. })
    ));

    let mut bad = bytes.clone();
    bad[1] = b'X';
    assert_eq!(Plaintext::import(&bad, &params), Err(FormatError::BadMagic));

    let mut bad = bytes.clone();
    bad[3] = 2;
    assert_eq!(
        Plaintext::import(&bad, &params),
        Err(FormatError::UnsupportedVersion { version: 2 })
    );

    assert!(matches!(
        Ciphertext::import(&bytes, &params),
        Err(FormatError::WrongKind { .. })
    ));

    let mut bad = bytes.clone();
    bad.extend_from_slice(&[0; 8]);
    assert_eq!(
        Plaintext::import(&bad, &params),
        Err(FormatError::TrailingBytes { extra: 8 })
    );

    let scale_offset = 3 + 1 + 1 + 32 + 4;
    let mut bad = bytes.clone();
    bad[scale_offset..scale_offset + 8].copy_from_slice(&f64::NAN.to_bits().to_le_bytes());
    assert!(matches!(
        Plaintext::import(&bad, &params),
        Err(FormatError::InvalidScale { .. })
    ));
}
