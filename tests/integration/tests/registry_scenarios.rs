//! Integration test: registry write and read semantics across crates.

use agegate_core::{Address, HubAttestation, DEFAULT_SCOPE};
use agegate_integration_tests::{hub, owner, user, Deployment, START_TIME};
use agegate_registry::{RecordOutcome, RegistryError};

// =========================================================================
// Recording tiers
// =========================================================================

#[test]
fn test_first_verification_at_18() {
    let d = Deployment::new();
    let u = user(1);

    let outcome = d.hub_callback(u, "18", 25).unwrap();
    assert_eq!(outcome, RecordOutcome::Created { min_age: 18 });

    let details = d.registry.get_verification_details(&u);
    assert_eq!(details.min_age, 18);
    assert_eq!(details.timestamp, START_TIME);
    assert!(details.is_verified);
    assert!(d.registry.is_verified_for_tier(&u, 18));
    assert!(!d.registry.is_verified_for_tier(&u, 21));
}

#[test]
fn test_upgrade_from_18_to_21() {
    let d = Deployment::new();
    let u = user(2);

    d.hub_callback(u, "18", 25).unwrap();
    d.clock.advance(3_600);
    let outcome = d.hub_callback(u, "21", 25).unwrap();
    assert_eq!(outcome, RecordOutcome::Upgraded { from: 18, to: 21 });

    let details = d.registry.get_verification_details(&u);
    assert_eq!(details.min_age, 21);
    assert_eq!(details.timestamp, START_TIME + 3_600);
    assert!(d.registry.is_verified_for_tier(&u, 18));
    assert!(d.registry.is_verified_for_tier(&u, 21));
}

#[test]
fn test_tier_never_decreases() {
    let d = Deployment::new();
    let u = user(3);

    d.hub_callback(u, "21", 30).unwrap();
    d.clock.advance(60);
    let outcome = d.hub_callback(u, "18", 30).unwrap();
    assert_eq!(outcome, RecordOutcome::Unchanged { min_age: 21 });

    let details = d.registry.get_verification_details(&u);
    assert_eq!(details.min_age, 21);
    assert_eq!(details.timestamp, START_TIME);
}

#[test]
fn test_repeat_callback_is_a_no_op() {
    let d = Deployment::new();
    let u = user(4);

    d.hub_callback(u, "18", 20).unwrap();
    d.clock.advance(500);
    d.hub_callback(u, "18", 20).unwrap();

    assert_eq!(d.registry.get_verification_details(&u).timestamp, START_TIME);
    assert_eq!(d.registry.events_since(0).len(), 1);
}

#[test]
fn test_unknown_address_reads_unverified() {
    let d = Deployment::new();
    let details = d.registry.get_verification_details(&user(99));
    assert_eq!(details.min_age, 0);
    assert_eq!(details.timestamp, 0);
    assert!(!details.is_verified);
    assert!(!d.registry.is_verified_for_tier(&user(99), 18));
}

#[test]
fn test_tier_query_with_arbitrary_threshold() {
    let d = Deployment::new();
    let u = user(5);
    d.hub_callback(u, "21", 40).unwrap();
    assert!(d.registry.is_verified_for_tier(&u, 0));
    assert!(d.registry.is_verified_for_tier(&u, 20));
    assert!(!d.registry.is_verified_for_tier(&u, 25));
}

// =========================================================================
// Rejections
// =========================================================================

#[test]
fn test_underage_disclosure_rejected() {
    let d = Deployment::new();
    let u = user(6);

    let err = d.hub_callback(u, "21", 19).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::AgeRequirementNotMet {
            required: 21,
            disclosed: 19
        }
    ));
    assert!(!d.registry.get_verification_details(&u).is_verified);
}

#[test]
fn test_unsupported_tier_rejected() {
    let d = Deployment::new();
    for data in ["16", "", "eighteen", "25"] {
        let err = d.hub_callback(user(7), data, 30).unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedTier(_)), "{data:?}");
    }
    assert_eq!(d.registry.record_count(), 0);
}

#[test]
fn test_non_hub_caller_rejected_before_anything_else() {
    let d = Deployment::new();
    let forged = HubAttestation {
        prover: user(8),
        scope: "someone-else".into(),
        user_defined_data: "99".into(),
        disclosed_min_age: 0,
    };
    let err = d.registry.record_verification(&user(8), &forged).unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized { .. }));
    assert!(!d.registry.get_verification_details(&user(8)).is_verified);
}

#[test]
fn test_scope_checked_before_tier() {
    let d = Deployment::new();
    let err = d
        .registry
        .record_verification(
            &hub(),
            &HubAttestation {
                prover: user(9),
                scope: "other-app".into(),
                user_defined_data: "16".into(),
                disclosed_min_age: 30,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::ScopeMismatch { .. }));
}

// =========================================================================
// Hub rotation and events
// =========================================================================

#[test]
fn test_rotated_hub_takes_over_callbacks() {
    let d = Deployment::new();
    let new_hub = Address::from_bytes([0x42; 20]);
    d.registry.rotate_hub(&owner(), new_hub).unwrap();

    let attestation = HubAttestation {
        prover: user(10),
        scope: DEFAULT_SCOPE.into(),
        user_defined_data: "18".into(),
        disclosed_min_age: 18,
    };
    assert!(matches!(
        d.registry.record_verification(&hub(), &attestation),
        Err(RegistryError::Unauthorized { .. })
    ));
    assert!(d.registry.record_verification(&new_hub, &attestation).is_ok());
}

#[test]
fn test_only_owner_rotates_hub() {
    let d = Deployment::new();
    assert!(matches!(
        d.registry.rotate_hub(&hub(), user(11)),
        Err(RegistryError::Unauthorized { .. })
    ));
    assert!(matches!(
        d.registry.rotate_hub(&owner(), Address::ZERO),
        Err(RegistryError::InvalidHub(_))
    ));
    assert_eq!(d.registry.hub_address(), hub());
}

#[test]
fn test_events_track_effective_writes() {
    let d = Deployment::new();
    let (a, b) = (user(12), user(13));

    d.hub_callback(a, "18", 18).unwrap();
    d.hub_callback(b, "21", 21).unwrap();
    d.hub_callback(a, "18", 18).unwrap();
    let _ = d.hub_callback(b, "21", 20);
    d.hub_callback(a, "21", 22).unwrap();

    let events = d.registry.events_since(0);
    let summary: Vec<_> = events.iter().map(|e| (e.prover, e.min_age)).collect();
    assert_eq!(summary, vec![(a, 18), (b, 21), (a, 21)]);
    assert_eq!(d.registry.events_since(2).len(), 1);
}

#[test]
fn test_config_ids_differ_per_tier() {
    let d = Deployment::new();
    let c18 = d.registry.config_18_plus().unwrap();
    let c21 = d.registry.config_21_plus().unwrap();
    assert_ne!(c18, c21);
    assert_eq!(Deployment::new().registry.config_18_plus().unwrap(), c18);
}
