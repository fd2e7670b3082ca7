//! HTTP API server for the AgeGate node.
//!
//! Exposes the registry entry points: the hub-only verification callback,
//! the public read queries, deployment configuration, the event log, and
//! hub rotation.
//!
//! Write requests carry an Ed25519 public key and a signature. The caller is
//! the address of the key that signed; there is no caller field to trust.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use agegate_core::{
    record_message, rotate_hub_message, Address, CoreError, EndpointMode, HubAttestation,
    PublicKey, Signature, VerificationDetails,
};
use agegate_registry::{RecordOutcome, RegistryError, VerificationEvent};

use crate::state::NodeState;

// --- Request / response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct RegistryInfoResponse {
    pub version: String,
    pub scope: String,
    pub hub_address: Address,
    pub owner: Address,
    pub registry_address: Option<Address>,
    pub mode: EndpointMode,
    pub config_18_plus: Option<String>,
    pub config_21_plus: Option<String>,
    pub records: usize,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct DetailsResponse {
    pub address: Address,
    #[serde(flatten)]
    pub details: VerificationDetails,
}

#[derive(Serialize)]
pub struct TierResponse {
    pub address: Address,
    pub tier: u64,
    pub verified: bool,
}

#[derive(Deserialize)]
pub struct RecordRequest {
    pub prover: String,
    pub scope: String,
    pub user_defined_data: String,
    pub disclosed_min_age: u64,
    /// Hex Ed25519 key of the submitter; its address must be the hub.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Hex signature over `record_message` of the attestation.
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub prover: Address,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
    pub details: VerificationDetails,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub from: u64,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<VerificationEvent>,
    pub count: usize,
}

#[derive(Deserialize)]
pub struct RotateHubRequest {
    pub new_hub: String,
    /// Hex Ed25519 key of the owner.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Hex signature over `rotate_hub_message(current_hub, new_hub)`.
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Serialize)]
pub struct RotateHubResponse {
    pub hub_address: Address,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, kind: &str, error: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            kind: kind.into(),
        }),
    )
}

fn parse_address(input: &str) -> Result<Address, ApiError> {
    Address::parse(input)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "invalid_address", e.to_string()))
}

fn forbidden(e: CoreError) -> ApiError {
    api_error(StatusCode::FORBIDDEN, "unauthorized", e.to_string())
}

/// Verify a request signature and return the address of the signing key.
fn authenticate(
    public_key: Option<&str>,
    signature: Option<&str>,
    message: &[u8],
) -> Result<Address, ApiError> {
    let (Some(public_key), Some(signature)) = (public_key, signature) else {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "unauthorized",
            "request is not signed".into(),
        ));
    };
    let public_key = PublicKey::from_hex(public_key).map_err(forbidden)?;
    let signature = Signature::from_hex(signature).map_err(forbidden)?;
    public_key.verify(message, &signature).map_err(|e| {
        tracing::warn!(key = %public_key.to_hex(), "rejected request with bad signature");
        forbidden(e)
    })?;
    Ok(public_key.address())
}

fn registry_error(e: RegistryError) -> ApiError {
    let (status, kind) = match &e {
        RegistryError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
        RegistryError::ScopeMismatch { .. } => (StatusCode::BAD_REQUEST, "scope_mismatch"),
        RegistryError::UnsupportedTier(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "unsupported_tier")
        }
        RegistryError::AgeRequirementNotMet { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "age_requirement_not_met")
        }
        RegistryError::InvalidHub(_) => (StatusCode::BAD_REQUEST, "invalid_hub"),
        RegistryError::StaleHub { .. } => (StatusCode::CONFLICT, "stale_hub"),
        RegistryError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
        RegistryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
    };
    api_error(status, kind, e.to_string())
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_registry_info(State(state): State<Arc<NodeState>>) -> Json<RegistryInfoResponse> {
    let registry = &state.registry;
    Json(RegistryInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        scope: registry.scope().to_string(),
        hub_address: registry.hub_address(),
        owner: registry.owner(),
        registry_address: state.registry_address,
        mode: state.mode,
        config_18_plus: registry.config_18_plus(),
        config_21_plus: registry.config_21_plus(),
        records: registry.record_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_details(
    State(state): State<Arc<NodeState>>,
    Path(address): Path<String>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let address = parse_address(&address)?;
    Ok(Json(DetailsResponse {
        address,
        details: state.registry.get_verification_details(&address),
    }))
}

async fn handle_tier(
    State(state): State<Arc<NodeState>>,
    Path((address, tier)): Path<(String, u64)>,
) -> Result<Json<TierResponse>, ApiError> {
    let address = parse_address(&address)?;
    Ok(Json(TierResponse {
        address,
        tier,
        verified: state.registry.is_verified_for_tier(&address, tier),
    }))
}

async fn handle_record(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let prover = parse_address(&req.prover)?;
    let attestation = HubAttestation {
        prover,
        scope: req.scope,
        user_defined_data: req.user_defined_data,
        disclosed_min_age: req.disclosed_min_age,
    };
    let caller = authenticate(
        req.public_key.as_deref(),
        req.signature.as_deref(),
        &record_message(&attestation),
    )?;

    let outcome = state
        .registry
        .record_verification(&caller, &attestation)
        .map_err(registry_error)?;

    Ok(Json(RecordResponse {
        prover,
        outcome,
        details: state.registry.get_verification_details(&prover),
    }))
}

async fn handle_events(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let events = state.registry.events_since(query.from);
    let count = events.len();
    Json(EventsResponse { events, count })
}

async fn handle_rotate_hub(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<RotateHubRequest>,
) -> Result<Json<RotateHubResponse>, ApiError> {
    let new_hub = parse_address(&req.new_hub)?;
    let current = state.registry.hub_address();
    let caller = authenticate(
        req.public_key.as_deref(),
        req.signature.as_deref(),
        &rotate_hub_message(&current, &new_hub),
    )?;
    state
        .registry
        .rotate_hub_from(&caller, current, new_hub)
        .map_err(registry_error)?;
    Ok(Json(RotateHubResponse {
        hub_address: state.registry.hub_address(),
    }))
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/registry", get(handle_registry_info))
        .route("/api/v1/verifications", post(handle_record))
        .route("/api/v1/verifications/{address}", get(handle_details))
        .route("/api/v1/verifications/{address}/tiers/{tier}", get(handle_tier))
        .route("/api/v1/events", get(handle_events))
        .route("/api/v1/admin/hub", post(handle_rotate_hub))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agegate_client::{HttpRegistryReader, RegistryReader};
    use agegate_core::{KeyPair, RegistryConfig};
    use agegate_registry::{ManualClock, VerificationRegistry};
    use serde_json::{json, Value};

    const SCOPE: &str = "agegate-ai-v1";
    const PROVER: &str = "0xabc0000000000000000000000000000000000abc";

    fn hub_key() -> KeyPair {
        KeyPair::from_seed(&[0x16; 32])
    }

    fn owner_key() -> KeyPair {
        KeyPair::from_seed(&[0xee; 32])
    }

    async fn spawn_server() -> (String, Arc<NodeState>) {
        let config = RegistryConfig::new(hub_key().address(), owner_key().address(), SCOPE);
        let registry =
            VerificationRegistry::new(config, Arc::new(ManualClock::new(1_750_000_000))).unwrap();
        let state = Arc::new(NodeState::new(
            Arc::new(registry),
            Some(Address::from_bytes([0x11; 20])),
            EndpointMode::Testnet,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    fn attestation(data: &str, disclosed: u64) -> HubAttestation {
        HubAttestation {
            prover: Address::parse(PROVER).unwrap(),
            scope: SCOPE.into(),
            user_defined_data: data.into(),
            disclosed_min_age: disclosed,
        }
    }

    fn unsigned_body(data: &str, disclosed: u64) -> Value {
        json!({
            "prover": PROVER,
            "scope": SCOPE,
            "user_defined_data": data,
            "disclosed_min_age": disclosed,
        })
    }

    fn signed_body(key: &KeyPair, data: &str, disclosed: u64) -> Value {
        let mut body = unsigned_body(data, disclosed);
        let sig = key.sign(&record_message(&attestation(data, disclosed)));
        body["public_key"] = json!(key.public_key().to_hex());
        body["signature"] = json!(sig.to_hex());
        body
    }

    fn rotation_body(key: &KeyPair, current: &Address, new_hub: &Address) -> Value {
        let sig = key.sign(&rotate_hub_message(current, new_hub));
        json!({
            "new_hub": new_hub.to_string(),
            "public_key": key.public_key().to_hex(),
            "signature": sig.to_hex(),
        })
    }

    async fn post(url: &str, body: &Value) -> reqwest::Response {
        reqwest::Client::new().post(url).json(body).send().await.unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/api/v1/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_registry_info() {
        let (base, _) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/api/v1/registry", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["scope"], SCOPE);
        assert_eq!(body["hub_address"], hub_key().address().to_string());
        assert_eq!(body["mode"], "testnet");
        assert!(body["config_18_plus"].is_string());
        assert_ne!(body["config_18_plus"], body["config_21_plus"]);
    }

    #[tokio::test]
    async fn test_unknown_address_details() {
        let (base, _) = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/api/v1/verifications/{}", base, PROVER))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["min_age"], 0);
        assert_eq!(body["timestamp"], 0);
        assert_eq!(body["is_verified"], false);
    }

    #[tokio::test]
    async fn test_invalid_address_is_bad_request() {
        let (base, _) = spawn_server().await;
        let resp = reqwest::get(format!("{}/api/v1/verifications/0x123", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsigned_callback_forbidden() {
        let (base, state) = spawn_server().await;
        let url = format!("{}/api/v1/verifications", base);

        let mut body = unsigned_body("21", 99);
        // A claimed caller field carries no weight.
        body["caller"] = json!(hub_key().address().to_string());
        let resp = post(&url, &body).await;
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "unauthorized");
        assert_eq!(state.registry.record_count(), 0);
    }

    #[tokio::test]
    async fn test_badly_signed_callback_forbidden() {
        let (base, state) = spawn_server().await;
        let url = format!("{}/api/v1/verifications", base);
        let intruder = KeyPair::from_seed(&[0x66; 32]);

        // Hub's public key, intruder's signature.
        let mut forged = signed_body(&intruder, "21", 99);
        forged["public_key"] = json!(hub_key().public_key().to_hex());
        assert_eq!(post(&url, &forged).await.status(), reqwest::StatusCode::FORBIDDEN);

        // Validly signed by the hub, then altered in transit.
        let mut tampered = signed_body(&hub_key(), "18", 25);
        tampered["user_defined_data"] = json!("21");
        assert_eq!(post(&url, &tampered).await.status(), reqwest::StatusCode::FORBIDDEN);

        // Validly signed by a key that is not the hub.
        let resp = post(&url, &signed_body(&intruder, "21", 99)).await;
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

        let mut garbage = signed_body(&hub_key(), "18", 25);
        garbage["signature"] = json!("not-hex");
        assert_eq!(post(&url, &garbage).await.status(), reqwest::StatusCode::FORBIDDEN);

        assert_eq!(state.registry.record_count(), 0);
        assert!(state.registry.events_since(0).is_empty());
    }

    #[tokio::test]
    async fn test_signed_callback_then_read_through_http_reader() {
        let (base, _) = spawn_server().await;
        let resp = post(
            &format!("{}/api/v1/verifications", base),
            &signed_body(&hub_key(), "18", 25),
        )
        .await;
        assert!(resp.status().is_success());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["outcome"], "created");
        assert_eq!(body["details"]["min_age"], 18);

        let reader = HttpRegistryReader::new(base.clone());
        let prover = Address::parse(PROVER).unwrap();
        assert!(reader.is_verified_for_tier(&prover, 18).await.unwrap());
        assert!(!reader.is_verified_for_tier(&prover, 21).await.unwrap());

        let tier: Value = reqwest::get(format!(
            "{}/api/v1/verifications/{}/tiers/21",
            base, PROVER
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(tier["verified"], false);
    }

    #[tokio::test]
    async fn test_record_error_statuses() {
        let (base, state) = spawn_server().await;
        let url = format!("{}/api/v1/verifications", base);

        let resp = post(&url, &signed_body(&hub_key(), "18", 15)).await;
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "age_requirement_not_met");

        let mut other_scope = attestation("18", 25);
        other_scope.scope = "other-app".into();
        let sig = hub_key().sign(&record_message(&other_scope));
        let body = json!({
            "prover": PROVER,
            "scope": "other-app",
            "user_defined_data": "18",
            "disclosed_min_age": 25,
            "public_key": hub_key().public_key().to_hex(),
            "signature": sig.to_hex(),
        });
        assert_eq!(post(&url, &body).await.status(), reqwest::StatusCode::BAD_REQUEST);

        assert_eq!(state.registry.record_count(), 0);
    }

    #[tokio::test]
    async fn test_events_and_hub_rotation() {
        let (base, state) = spawn_server().await;
        post(
            &format!("{}/api/v1/verifications", base),
            &signed_body(&hub_key(), "21", 30),
        )
        .await;

        let events: Value = reqwest::get(format!("{}/api/v1/events?from=0", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(events["count"], 1);
        assert_eq!(events["events"][0]["min_age"], 21);

        let url = format!("{}/api/v1/admin/hub", base);
        let old_hub = hub_key().address();
        let new_key = KeyPair::from_seed(&[0xf1; 32]);
        let new_hub = new_key.address();

        let unsigned = json!({ "new_hub": new_hub.to_string() });
        assert_eq!(post(&url, &unsigned).await.status(), reqwest::StatusCode::FORBIDDEN);
        let by_hub = rotation_body(&hub_key(), &old_hub, &new_hub);
        assert_eq!(post(&url, &by_hub).await.status(), reqwest::StatusCode::FORBIDDEN);
        assert_eq!(state.registry.hub_address(), old_hub);

        let resp = post(&url, &rotation_body(&owner_key(), &old_hub, &new_hub)).await;
        assert!(resp.status().is_success());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["hub_address"], new_hub.to_string());

        // The old hub's key no longer records.
        let resp = post(
            &format!("{}/api/v1/verifications", base),
            &signed_body(&hub_key(), "18", 30),
        )
        .await;
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_rotation_cannot_be_replayed() {
        let (base, state) = spawn_server().await;
        let url = format!("{}/api/v1/admin/hub", base);
        let a = hub_key().address();
        let b = KeyPair::from_seed(&[0xb0; 32]).address();
        let c = KeyPair::from_seed(&[0xc0; 32]).address();

        let a_to_b = rotation_body(&owner_key(), &a, &b);
        assert!(post(&url, &a_to_b).await.status().is_success());
        assert!(post(&url, &rotation_body(&owner_key(), &b, &c))
            .await
            .status()
            .is_success());

        assert_eq!(post(&url, &a_to_b).await.status(), reqwest::StatusCode::FORBIDDEN);
        assert_eq!(state.registry.hub_address(), c);
    }
}
