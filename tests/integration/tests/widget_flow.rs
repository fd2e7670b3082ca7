//! Integration test: the relying-site widget driven against a live registry.

use std::time::Duration;

use agegate_client::{AgeGateWidget, ChallengeSettings, SettlePolicy, WidgetConfig};
use agegate_core::{Address, AgeTier, EndpointMode, WidgetState, DEFAULT_SCOPE};
use agegate_integration_tests::{user, Deployment, LocalReader, START_TIME};

fn widget(d: &Deployment, tier: AgeTier) -> AgeGateWidget<LocalReader> {
    AgeGateWidget::new(
        d.reader(),
        WidgetConfig {
            site_name: "Night Owl".into(),
            tier,
            challenge: ChallengeSettings {
                scope: DEFAULT_SCOPE.into(),
                registry_address: Address::from_bytes([0x77; 20]),
                mode: EndpointMode::Testnet,
            },
            settle: SettlePolicy {
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(40),
                max_wait: Duration::from_millis(600),
            },
        },
    )
}

#[tokio::test]
async fn test_no_wallet_shows_connect_prompt() {
    let d = Deployment::new();
    let mut w = widget(&d, AgeTier::Eighteen);
    assert_eq!(w.load(None).await, WidgetState::NotConnected);
    assert!(w.challenge().is_none());
}

#[tokio::test]
async fn test_verified_user_on_another_site_passes_immediately() {
    let d = Deployment::new();
    let u = user(1);
    d.hub_callback(u, "18", 30).unwrap();

    let mut w = widget(&d, AgeTier::Eighteen);
    assert_eq!(w.load(Some(u)).await, WidgetState::Verified);
    assert_eq!(
        w.verified_at().map(|t| t.timestamp() as u64),
        Some(START_TIME)
    );
    assert!(w.challenge().is_none());
}

#[tokio::test]
async fn test_18_verified_user_needs_proof_on_21_site() {
    let d = Deployment::new();
    let u = user(2);
    d.hub_callback(u, "18", 19).unwrap();

    let mut w = widget(&d, AgeTier::TwentyOne);
    assert_eq!(w.load(Some(u)).await, WidgetState::NeedsProof);

    let challenge = w.challenge().unwrap();
    assert_eq!(challenge.user_defined_data, "21");
    assert_eq!(challenge.disclosure_request.minimum_age, 21);
    assert_eq!(challenge.requested_tier(), Some(AgeTier::TwentyOne));
    assert_eq!(challenge.requester_address, u.to_string());
}

#[tokio::test]
async fn test_proof_success_settles_once_the_write_lands() {
    let d = Deployment::new();
    let u = user(3);
    let mut w = widget(&d, AgeTier::Eighteen);
    assert_eq!(w.load(Some(u)).await, WidgetState::NeedsProof);

    let registry = d.registry.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        registry
            .record_verification(
                &registry.hub_address(),
                &agegate_core::HubAttestation {
                    prover: u,
                    scope: DEFAULT_SCOPE.into(),
                    user_defined_data: "18".into(),
                    disclosed_min_age: 22,
                },
            )
            .unwrap();
    });

    let state = w.on_proof_success().await.unwrap();
    writer.await.unwrap();
    assert_eq!(state, WidgetState::Verified);
    assert!(d.registry.is_verified_for_tier(&u, 18));
}

#[tokio::test]
async fn test_proof_success_without_write_ends_in_check_failed() {
    let d = Deployment::new();
    let u = user(4);
    let mut w = widget(&d, AgeTier::Eighteen);
    w.load(Some(u)).await;

    let state = w.on_proof_success().await.unwrap();
    assert_eq!(state, WidgetState::CheckFailed);
    assert!(w.last_error().is_some());

    // Once the write finally lands a retry picks it up.
    d.hub_callback(u, "18", 18).unwrap();
    assert_eq!(w.retry().await.unwrap(), WidgetState::Verified);
}

#[tokio::test]
async fn test_proof_error_keeps_challenge() {
    let d = Deployment::new();
    let mut w = widget(&d, AgeTier::Eighteen);
    w.load(Some(user(5))).await;

    w.on_proof_error(Some("E_CANCELLED".into()), None).unwrap();
    assert_eq!(w.state(), WidgetState::NeedsProof);
    assert_eq!(w.message(), Some("Verification failed. Please try again."));
    assert!(w.challenge().is_some());
}

#[tokio::test]
async fn test_account_switch_rechecks() {
    let d = Deployment::new();
    let (verified, fresh) = (user(6), user(7));
    d.hub_callback(verified, "21", 35).unwrap();

    let mut w = widget(&d, AgeTier::TwentyOne);
    assert_eq!(w.load(Some(verified)).await, WidgetState::Verified);
    assert_eq!(w.load(Some(fresh)).await, WidgetState::NeedsProof);
    assert_eq!(w.load(None).await, WidgetState::NotConnected);
    assert!(w.verified_at().is_none());
}
