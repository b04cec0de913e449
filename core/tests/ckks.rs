use hedist_core::{
    Ciphertext, Context, Decryptor, Encoder, Encryptor, Error, Evaluator, KeyGenerator,
    KeySwitching, ModulusChain, ParametersLiteral, Plaintext, PublicKey, RelinearizationKey,
    Scheme, SecretKey, SecurityLevel,
};
use hedist_sampling::source::Source;
use num::complex::Complex64;

fn literal(data: Vec<u32>) -> ParametersLiteral {
    ParametersLiteral {
        scheme: Scheme::Ckks,
        plaintext_modulus: 0,
        ring_degree: Some(1 << 11),
        chain: ModulusChain::Bits {
            data,
            special: Some(60),
        },
        leveled: true,
        key_switching: KeySwitching::Hybrid,
        security: SecurityLevel::NotSet,
        sigma: 3.19,
        scale: Some((1u64 << 40) as f64),
    }
}

fn encrypt(ctx: &Context, pk: &PublicKey, v: f64, source: &mut Source) -> Ciphertext {
    let pt: Plaintext = Encoder::new(ctx)
        .encode_complex(&[Complex64::new(v, 0.0)], None)
        .unwrap();
    Encryptor::new(ctx, pk).encrypt(&pt, source).unwrap()
}

fn decrypt(ctx: &Context, sk: &SecretKey, ct: &Ciphertext) -> Complex64 {
    let pt: Plaintext = Decryptor::new(ctx, sk).decrypt(ct).unwrap();
    Encoder::new(ctx).decode_complex(&pt).unwrap()[0]
}

#[test]
fn squared_distance_after_rescaling() {
    let ctx: Context = Context::new(&literal(vec![60, 40, 40])).unwrap();
    let mut source: Source = Source::from_u64(1);
    let keygen: KeyGenerator = KeyGenerator::new(&ctx);
    let sk: SecretKey = keygen.gen_secret_key(&mut source);
    let pk: PublicKey = keygen.gen_public_key(&sk, &mut source).unwrap();
    let rlk: RelinearizationKey = keygen.gen_relinearization_key(&sk, &mut source).unwrap();

    let x1: Ciphertext = encrypt(&ctx, &pk, 1.304, &mut source);
    let y1: Ciphertext = encrypt(&ctx, &pk, 103.874, &mut source);
    let x2: Ciphertext = encrypt(&ctx, &pk, 1.290, &mut source);
    let y2: Ciphertext = encrypt(&ctx, &pk, 103.789, &mut source);

    let eval: Evaluator = Evaluator::new(&ctx, Some(&rlk));
    let dx: Ciphertext = eval.sub(&x1, &x2).unwrap();
    let dy: Ciphertext = eval.sub(&y1, &y2).unwrap();
    let dx2: Ciphertext = eval.composed_mul(&dx, &dx).unwrap();
    let dy2: Ciphertext = eval.composed_mul(&dy, &dy).unwrap();
    let d: Ciphertext = eval.add(&dx2, &dy2).unwrap();

    assert_eq!(d.level(), 1);
    assert!((d.scale().log2() - 40.0).abs() < 0.5);

    let expected: f64 = 0.014f64.powi(2) + 0.085f64.powi(2);
    let got: Complex64 = decrypt(&ctx, &sk, &d);
    assert!((got.re - expected).abs() < 1e-6, "got {} expected {}", got, expected);
    assert!(got.im.abs() < 1e-6);
}

#[test]
fn scales_must_match_for_addition() {
    let ctx: Context = Context::new(&literal(vec![60, 40, 40])).unwrap();
    let mut source: Source = Source::from_u64(2);
    let keygen: KeyGenerator = KeyGenerator::new(&ctx);
    let sk: SecretKey = keygen.gen_secret_key(&mut source);
    let pk: PublicKey = keygen.gen_public_key(&sk, &mut source).unwrap();
    let rlk: RelinearizationKey = keygen.gen_relinearization_key(&sk, &mut source).unwrap();

    let a: Ciphertext = encrypt(&ctx, &pk, 0.5, &mut source);
    let eval: Evaluator = Evaluator::new(&ctx, Some(&rlk));

    // Unrescaled square carries scale 2^80.
    let sq: Ciphertext = eval.mul(&a, &a).unwrap();
    assert!(matches!(eval.add(&sq, &a), Err(Error::Mismatch(_))));

    let sq: Ciphertext = eval.rescale(&sq).unwrap();
    let sum: Ciphertext = eval.add(&sq, &sq).unwrap();
    assert_eq!(sum.level(), 1);
    assert!((decrypt(&ctx, &sk, &sum).re - 0.5).abs() < 1e-6);

    // Dropping primes keeps the scale.
    let low: Ciphertext = eval.lower_to(&a, 0).unwrap();
    assert_eq!(low.scale(), a.scale());
    assert!((decrypt(&ctx, &sk, &low).re - 0.5).abs() < 1e-6);
}

#[test]
fn rescale_at_last_level_exhausts_depth() {
    let ctx: Context = Context::new(&literal(vec![60])).unwrap();
    let mut source: Source = Source::from_u64(3);
    let keygen: KeyGenerator = KeyGenerator::new(&ctx);
    let sk: SecretKey = keygen.gen_secret_key(&mut source);
    let pk: PublicKey = keygen.gen_public_key(&sk, &mut source).unwrap();
    let rlk: RelinearizationKey = keygen.gen_relinearization_key(&sk, &mut source).unwrap();

    let a: Ciphertext = encrypt(&ctx, &pk, 1.0, &mut source);
    let eval: Evaluator = Evaluator::new(&ctx, Some(&rlk));
    assert_eq!(eval.rescale(&a), Err(Error::DepthExhausted { level: 0 }));
    assert_eq!(eval.composed_mul(&a, &a), Err(Error::DepthExhausted { level: 0 }));
}
