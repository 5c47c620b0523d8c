//! Golden test vector validation
//!
//! The vectors in testdata/golden-vectors.json were produced by the browser
//! WebCrypto implementation of the envelope format (PBKDF2 SHA-256, 600000
//! iterations, AES-GCM 256) with fixed salts and nonces.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use sealnote::ErrorKind;
use sealnote::kdf::{NONCE_LEN, SALT_LEN};
use sealnote::secretcrypt;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    plaintext: String,
    password: String,
    salt: String,
    nonce: String,
    envelope: String,
    comment: String,
}

fn load_golden_vectors() -> Vec<GoldenVector> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data).expect("failed to parse golden vectors")
}

fn decode_fixed<const N: usize>(encoded: &str) -> [u8; N] {
    BASE64_STANDARD
        .decode(encoded)
        .expect("failed to decode base64")
        .try_into()
        .unwrap_or_else(|v: Vec<u8>| panic!("expected {} bytes, got {}", N, v.len()))
}

/// Run golden vector tests on specified indices
///
/// If `indices` is None, tests all vectors. Otherwise tests only
/// the specified indices.
fn run_golden_vector_tests(indices: Option<&[usize]>) {
    let vectors = load_golden_vectors();

    let selected: Vec<(usize, &GoldenVector)> = match indices {
        Some(idx) => idx
            .iter()
            .map(|&i| {
                assert!(
                    i < vectors.len(),
                    "Index {} is out of bounds (only {} vectors available)",
                    i,
                    vectors.len()
                );
                (i, &vectors[i])
            })
            .collect(),
        None => vectors.iter().enumerate().collect(),
    };

    println!("Testing {} golden vectors", selected.len());

    let mut failed = 0;
    for (i, vector) in &selected {
        let salt = decode_fixed::<SALT_LEN>(&vector.salt);
        let nonce = decode_fixed::<NONCE_LEN>(&vector.nonce);

        // Deterministic encryption reproduces the exact envelope
        match secretcrypt::encrypt_deterministic(&vector.plaintext, &vector.password, &salt, &nonce) {
            Ok(envelope) if envelope == vector.envelope => {}
            Ok(envelope) => {
                eprintln!("Vector {}: FAILED - envelope mismatch", i);
                eprintln!("  Comment: {}", vector.comment);
                eprintln!("  Expected: {}", vector.envelope);
                eprintln!("  Actual:   {}", envelope);
                failed += 1;
                continue;
            }
            Err(e) => {
                eprintln!("Vector {}: FAILED to encrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        }

        match secretcrypt::decrypt(&vector.envelope, &vector.password) {
            Ok(plaintext) if plaintext == vector.plaintext => {}
            Ok(plaintext) => {
                eprintln!("Vector {}: FAILED - plaintext mismatch", i);
                eprintln!("  Comment: {}", vector.comment);
                eprintln!("  Expected length: {}", vector.plaintext.len());
                eprintln!("  Actual length: {}", plaintext.len());
                failed += 1;
            }
            Err(e) => {
                eprintln!("Vector {}: FAILED to decrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
            }
        }
    }

    println!(
        "Results: {} passed, {} failed out of {} total",
        selected.len() - failed,
        failed,
        selected.len()
    );

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(!selected.is_empty(), "No golden vectors were tested");
}

/// A diverse subset for regular test runs: empty plaintext and password,
/// non-ASCII plaintext, non-ASCII password.
#[test]
fn test_golden_vectors_subset() {
    run_golden_vector_tests(Some(&[0, 4, 5]));
}

/// Test all golden vectors (run with --ignored flag)
///
/// Run with: cargo test test_all_golden_vectors -- --ignored
#[test]
#[ignore]
fn test_all_golden_vectors() {
    run_golden_vector_tests(None);
}

#[test]
fn test_golden_vector_rejects_wrong_password() {
    let vectors = load_golden_vectors();
    let vector = &vectors[1];

    let err = secretcrypt::decrypt(&vector.envelope, "Correct-horse").unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
}
