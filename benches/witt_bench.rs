use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use witt_rings::*;

fn bench_law_generation(c: &mut Criterion) {
    let zz = BaseRing::integers();
    c.bench_function("generate_law_polynomials_p3_prec4", |b| {
        b.iter(|| {
            let laws = WittPolynomials::generate(black_box(&zz), 3, 4).unwrap();
            black_box(laws);
        });
    });

    c.bench_function("generate_binomial_table_p3_prec5", |b| {
        b.iter(|| {
            let table = BinomialTable::generate(black_box(3), 5).unwrap();
            black_box(table);
        });
    });
}

fn bench_ring_operations(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);

    // The same field supports three strategies, which makes for a direct
    // comparison of the law implementations.
    let f9 = BaseRing::finite_field(3, 2).unwrap();
    let rings = [
        ("zq_isomorphism", WittVectorRing::new(&f9, 4, None, None).unwrap()),
        (
            "finotti",
            WittVectorRing::new(&f9, 4, None, Some(Algorithm::Finotti)).unwrap(),
        ),
        (
            "standard",
            WittVectorRing::new(&f9, 4, None, Some(Algorithm::Standard)).unwrap(),
        ),
    ];
    for (name, ring) in &rings {
        let x = ring.random_element(&mut rng);
        let y = ring.random_element(&mut rng);
        c.bench_function(&format!("add_gf9_prec4_{name}"), |b| {
            b.iter(|| black_box(black_box(&x).add(black_box(&y))));
        });
        c.bench_function(&format!("mul_gf9_prec4_{name}"), |b| {
            b.iter(|| black_box(black_box(&x).mul(black_box(&y))));
        });
    }

    let z7 = BaseRing::integers_mod_u64(7).unwrap();
    let ring = WittVectorRing::new(&z7, 6, Some(5), None).unwrap();
    let x = ring.random_element(&mut rng);
    let y = ring.random_element(&mut rng);
    c.bench_function("mul_z7_prec6_p_invertible", |b| {
        b.iter(|| black_box(black_box(&x).mul(black_box(&y))));
    });
}

fn bench_inversion(c: &mut Criterion) {
    let f3 = BaseRing::finite_field(3, 1).unwrap();
    let ring = WittVectorRing::new(&f3, 4, None, None).unwrap();
    let t = ring.from_int_coordinates(&[1, 2, 0, 1]).unwrap();
    c.bench_function("invert_gf3_prec4", |b| {
        b.iter(|| black_box(black_box(&t).invert().unwrap()));
    });
}

criterion_group!(
    benches,
    bench_law_generation,
    bench_ring_operations,
    bench_inversion
);
criterion_main!(benches);
