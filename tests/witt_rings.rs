use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use witt_rings::*;

fn witt_from_indices(
    ring: &WittVectorRing,
    elems: &[RingElement],
    idx: &[usize],
) -> WittVector {
    let coords: Vec<RingElement> = idx.iter().map(|&i| elems[i % elems.len()].clone()).collect();
    ring.from_coordinates(&coords).unwrap()
}

#[test]
fn automatic_algorithm_selection() {
    let f25 = BaseRing::finite_field(5, 2).unwrap();
    let w = WittVectorRing::new(&f25, 2, None, None).unwrap();
    assert_eq!(w.algorithm(), Algorithm::ZqIsomorphism);
    assert_eq!(w.prime(), 5);

    let f3 = BaseRing::finite_field(3, 1).unwrap();
    let poly = BaseRing::polynomials(&f3, &["t"]);
    let w = WittVectorRing::new(&poly, 2, None, None).unwrap();
    assert_eq!(w.algorithm(), Algorithm::Finotti);

    let z7 = BaseRing::integers_mod_u64(7).unwrap();
    let w = WittVectorRing::new(&z7, 2, Some(5), None).unwrap();
    assert_eq!(w.algorithm(), Algorithm::PInvertible);

    let zz = BaseRing::integers();
    let w = WittVectorRing::new(&zz, 2, Some(5), None).unwrap();
    assert_eq!(w.algorithm(), Algorithm::Standard);
}

#[test]
fn incompatible_algorithm_requests_fail() {
    let f25 = BaseRing::finite_field(5, 2).unwrap();
    assert!(matches!(
        WittVectorRing::new(&f25, 2, None, Some(Algorithm::PInvertible)),
        Err(WittError::IncompatibleAlgorithm { .. })
    ));

    let f3 = BaseRing::finite_field(3, 1).unwrap();
    let poly = BaseRing::polynomials(&f3, &["t"]);
    assert!(matches!(
        WittVectorRing::new(&poly, 2, None, Some(Algorithm::ZqIsomorphism)),
        Err(WittError::IncompatibleAlgorithm { .. })
    ));

    let zz = BaseRing::integers();
    assert!(matches!(
        WittVectorRing::new(&zz, 2, Some(5), Some(Algorithm::Finotti)),
        Err(WittError::IncompatibleAlgorithm { .. })
    ));
    assert!(matches!(
        WittVectorRing::new(&zz, 2, Some(5), Some(Algorithm::ZqIsomorphism)),
        Err(WittError::IncompatibleAlgorithm { .. })
    ));
    // 5 is not a unit in the integers
    assert!(matches!(
        WittVectorRing::new(&zz, 2, Some(5), Some(Algorithm::PInvertible)),
        Err(WittError::IncompatibleAlgorithm { .. })
    ));
}

#[test]
fn invalid_parameters_fail() {
    let zz = BaseRing::integers();
    assert!(matches!(
        WittVectorRing::new(&zz, 0, Some(5), None),
        Err(WittError::InvalidPrecision { precision: 0 })
    ));
    assert!(matches!(
        WittVectorRing::new(&zz, 2, Some(6), None),
        Err(WittError::NotPrime { p: 6 })
    ));
    assert!(matches!(
        WittVectorRing::new(&zz, 2, None, None),
        Err(WittError::NonPrimeCharacteristic { .. })
    ));
    let z6 = BaseRing::integers_mod_u64(6).unwrap();
    assert!(matches!(
        WittVectorRing::new(&z6, 2, None, None),
        Err(WittError::NonPrimeCharacteristic { .. })
    ));
}

#[test]
fn algorithm_names_parse() {
    assert_eq!("finotti".parse::<Algorithm>().unwrap(), Algorithm::Finotti);
    assert_eq!(
        "Zq_isomorphism".parse::<Algorithm>().unwrap(),
        Algorithm::ZqIsomorphism
    );
    assert!(matches!(
        "moon".parse::<Algorithm>(),
        Err(WittError::UnknownAlgorithm(_))
    ));
}

#[test]
fn three_strategies_agree_on_a_finite_field() {
    let f9 = BaseRing::finite_field(3, 2).unwrap();
    let rings = [
        WittVectorRing::new(&f9, 3, None, None).unwrap(),
        WittVectorRing::new(&f9, 3, None, Some(Algorithm::Finotti)).unwrap(),
        WittVectorRing::new(&f9, 3, None, Some(Algorithm::Standard)).unwrap(),
    ];
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    for _ in 0..25 {
        let x = rings[0].random_element(&mut rng);
        let y = rings[0].random_element(&mut rng);
        let sum = x.add(&y);
        let prod = x.mul(&y);
        for other in &rings[1..] {
            let xo = other.from_coordinates(x.coordinates()).unwrap();
            let yo = other.from_coordinates(y.coordinates()).unwrap();
            assert_eq!(xo.add(&yo).coordinates(), sum.coordinates());
            assert_eq!(xo.mul(&yo).coordinates(), prod.coordinates());
        }
    }
}

#[test]
fn iteration_matches_cardinality() {
    let f9 = BaseRing::finite_field(3, 2).unwrap();
    let w = WittVectorRing::new(&f9, 2, None, None).unwrap();
    let all: Vec<WittVector> = w.iter().unwrap().collect();
    assert_eq!(all.len(), 81);
    assert_eq!(
        w.cardinality(),
        Some(num_bigint::BigUint::from(81u64))
    );
    let distinct: HashSet<WittVector> = all.into_iter().collect();
    assert_eq!(distinct.len(), 81);
}

#[test]
fn teichmuller_lifts_are_multiplicative() {
    let f27 = BaseRing::finite_field(3, 3).unwrap();
    let w = WittVectorRing::new(&f27, 2, None, None).unwrap();
    for a in f27.elements().unwrap() {
        for b in f27.elements().unwrap() {
            let lifted = w.teichmuller_lift(&a).unwrap().mul(&w.teichmuller_lift(&b).unwrap());
            assert_eq!(lifted, w.teichmuller_lift(&a.mul(&b)).unwrap());
        }
    }
}

#[test]
fn integer_embedding_is_additive_and_multiplicative() {
    let zz = BaseRing::integers();
    let w = WittVectorRing::new(&zz, 3, Some(3), None).unwrap();
    for (a, b) in [(4i64, 9i64), (-2, 11), (-7, -5), (0, 13)] {
        let wa = w.from_i64(a).unwrap();
        let wb = w.from_i64(b).unwrap();
        assert_eq!(wa.add(&wb), w.from_i64(a + b).unwrap());
        assert_eq!(wa.mul(&wb), w.from_i64(a * b).unwrap());
    }
    for g in w.from_i64(11).unwrap().ghost_components() {
        assert_eq!(g, zz.from_i64(11));
    }
}

#[test]
fn inversion_walkthrough_over_gf3() {
    let f3 = BaseRing::finite_field(3, 1).unwrap();
    let w = WittVectorRing::new(&f3, 4, None, None).unwrap();
    let t = w.from_int_coordinates(&[1, 2, 0, 1]).unwrap();

    let u = &w.one() / &t;
    assert_eq!(u.to_string(), "(1, 1, 1, 0)");
    assert_eq!((&u + &t).to_string(), "(2, 1, 1, 1)");

    let u = &u + &w.one();
    assert_eq!((&u * &t).to_string(), "(2, 0, 0, 1)");
    assert_eq!((&u / &t).to_string(), "(2, 1, 2, 1)");
}

proptest! {
    #[test]
    fn ring_laws_over_gf9(
        xs in prop::collection::vec(0usize..9, 3),
        ys in prop::collection::vec(0usize..9, 3),
        zs in prop::collection::vec(0usize..9, 3)
    ) {
        let f9 = BaseRing::finite_field(3, 2).unwrap();
        let w = WittVectorRing::new(&f9, 3, None, None).unwrap();
        let elems = f9.elements().unwrap();
        let x = witt_from_indices(&w, &elems, &xs);
        let y = witt_from_indices(&w, &elems, &ys);
        let z = witt_from_indices(&w, &elems, &zs);

        prop_assert_eq!(x.add(&y), y.add(&x));
        prop_assert_eq!(x.add(&y).add(&z), x.add(&y.add(&z)));
        prop_assert_eq!(x.mul(&y), y.mul(&x));
        prop_assert_eq!(x.mul(&y).mul(&z), x.mul(&y.mul(&z)));
        prop_assert_eq!(x.mul(&y.add(&z)), x.mul(&y).add(&x.mul(&z)));
        prop_assert!(x.add(&x.neg()).is_zero());
        prop_assert_eq!(x.mul(&w.one()), x.clone());
        prop_assert_eq!(x.sub(&y).add(&y), x.clone());
    }

    #[test]
    fn p_invertible_agrees_with_standard(
        xs in prop::collection::vec(0i64..7, 3),
        ys in prop::collection::vec(0i64..7, 3)
    ) {
        let z7 = BaseRing::integers_mod_u64(7).unwrap();
        let fast = WittVectorRing::new(&z7, 3, Some(5), None).unwrap();
        let slow = WittVectorRing::new(&z7, 3, Some(5), Some(Algorithm::Standard)).unwrap();

        let xf = fast.from_int_coordinates(&xs).unwrap();
        let yf = fast.from_int_coordinates(&ys).unwrap();
        let xv = slow.from_int_coordinates(&xs).unwrap();
        let yv = slow.from_int_coordinates(&ys).unwrap();

        let (fast_sum, slow_sum) = (xf.add(&yf), xv.add(&yv));
        let (fast_prod, slow_prod) = (xf.mul(&yf), xv.mul(&yv));
        prop_assert_eq!(fast_sum.coordinates(), slow_sum.coordinates());
        prop_assert_eq!(fast_prod.coordinates(), slow_prod.coordinates());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn units_are_invertible_over_gf3(
        lead in 1i64..3,
        rest in prop::collection::vec(0i64..3, 3)
    ) {
        let f3 = BaseRing::finite_field(3, 1).unwrap();
        let w = WittVectorRing::new(&f3, 4, None, None).unwrap();
        let mut coords = vec![lead];
        coords.extend(rest);
        let v = w.from_int_coordinates(&coords).unwrap();
        let inv = v.invert().unwrap();
        prop_assert!(v.mul(&inv).is_one());
    }
}
