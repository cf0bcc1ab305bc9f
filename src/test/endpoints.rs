use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::net::{EndpointId, Endpoints};
use crate::sim::SimError;

#[test]
fn default_endpoints_are_four_pcs_around_one_switch() {
    let eps = Endpoints::default();
    assert_eq!(eps.len(), 4);
    assert_eq!(eps.relay_name(), "SWITCH");
    assert_eq!(eps.name(EndpointId(0)), Some("PC1"));
    assert_eq!(eps.find("PC4"), Some(EndpointId(3)));
    assert_eq!(eps.name(EndpointId(9)), None);
}

#[test]
fn endpoints_reject_too_few_or_duplicate_terminals() {
    assert!(matches!(
        Endpoints::new(["a"], "sw"),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(matches!(
        Endpoints::new(["a", "a"], "sw"),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(matches!(
        Endpoints::new(["a", "sw"], "sw"),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(Endpoints::new(["a", "b"], "sw").is_ok());
}

#[test]
fn pick_pair_is_always_distinct_and_covers_every_ordered_pair() {
    let eps = Endpoints::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = HashSet::new();
    for _ in 0..2_000 {
        let (src, dst) = eps.pick_pair(&mut rng);
        assert_ne!(src, dst);
        assert!(src.0 < eps.len() && dst.0 < eps.len());
        seen.insert((src, dst));
    }
    assert_eq!(seen.len(), 4 * 3);
}

#[test]
fn pick_pair_with_two_terminals_alternates_roles_only() {
    let eps = Endpoints::new(["h0", "h1"], "s0").expect("valid");
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let (src, dst) = eps.pick_pair(&mut rng);
        assert_eq!(src.0 + dst.0, 1);
    }
}
