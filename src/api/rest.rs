use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::SimLensError;
use crate::rpc::SimulationProvider;
use crate::simulation::SimulationEngine;
use crate::types::SimulationOutcome;

/// API State
pub struct ApiState<P> {
    pub engine: Arc<SimulationEngine<P>>,
    pub network: &'static str,
}

impl<P> Clone for ApiState<P> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            network: self.network,
        }
    }
}

/// Request body for simulation: exactly one of the two inputs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub transaction: Option<String>,
    pub signature: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub network: String,
    pub known_programs: usize,
}

/// Create REST API router
pub fn create_router<P>(state: ApiState<P>) -> Router
where
    P: SimulationProvider + 'static,
{
    Router::new()
        .route("/health", get(health_check::<P>))
        .route("/simulate", post(simulate::<P>))
        .route("/simulate/:signature", get(simulate_signature::<P>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check<P: SimulationProvider + 'static>(
    State(state): State<ApiState<P>>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        network: state.network.to_string(),
        known_programs: state.engine.registry().len(),
    })
}

/// Simulate a base64 transaction, or explain a landed one by signature
async fn simulate<P: SimulationProvider + 'static>(
    State(state): State<ApiState<P>>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<SimulationOutcome>, AppError> {
    let outcome = match (payload.transaction, payload.signature) {
        (Some(transaction), None) => {
            info!("API: Simulating transaction ({} chars)", transaction.len());
            state.engine.analyze_base64(&transaction).await?
        }
        (None, Some(signature)) => {
            info!("API: Explaining signature {}", signature);
            state.engine.analyze_signature_str(&signature).await?
        }
        _ => {
            return Err(AppError::from(SimLensError::invalid_request(
                "Provide exactly one of `transaction` or `signature`",
            )))
        }
    };

    Ok(Json(outcome))
}

async fn simulate_signature<P: SimulationProvider + 'static>(
    State(state): State<ApiState<P>>,
    Path(signature): Path<String>,
) -> Result<Json<SimulationOutcome>, AppError> {
    info!("API: Explaining signature {}", signature);

    let outcome = state.engine.analyze_signature_str(&signature).await?;
    Ok(Json(outcome))
}

/// API error wrapper
#[derive(Debug)]
pub struct AppError(SimLensError);

impl From<SimLensError> for AppError {
    fn from(err: SimLensError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SimLensError::Decode(_)
            | SimLensError::SignatureParse(_)
            | SimLensError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            err if err.is_transport() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self.0 {
            SimLensError::SignatureParse(_) => "Invalid transaction signature".to_string(),
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProgramRegistry;
    use crate::rpc::mock::{encode, legacy_transaction, MockProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::system_instruction;
    use tower::ServiceExt;

    fn router(provider: MockProvider) -> Router {
        let engine = SimulationEngine::new(Arc::new(provider), Arc::new(ProgramRegistry::default()));
        create_router(ApiState {
            engine: Arc::new(engine),
            network: "devnet",
        })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(MockProvider::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["network"], "devnet");
    }

    #[tokio::test]
    async fn test_simulate_transaction() {
        let payer = Pubkey::new_unique();
        let tx = legacy_transaction(
            &[system_instruction::transfer(&payer, &Pubkey::new_unique(), 1_000)],
            &payer,
        );

        let response = router(MockProvider::default())
            .oneshot(post_json("/simulate", serde_json::json!({ "transaction": encode(&tx) })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["instructions"][0]["type"], "SOL Transfer");
        assert_eq!(body["riskAnalysis"]["score"], 0);
    }

    #[tokio::test]
    async fn test_malformed_transaction_is_bad_request() {
        let response = router(MockProvider::default())
            .oneshot(post_json("/simulate", serde_json::json!({ "transaction": "AQID" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("too short"));
    }

    #[tokio::test]
    async fn test_ambiguous_request_is_rejected() {
        let response = router(MockProvider::default())
            .oneshot(post_json("/simulate", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_signature_path() {
        let response = router(MockProvider::default())
            .oneshot(
                Request::builder()
                    .uri("/simulate/not-a-signature")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid transaction signature");
    }

    #[tokio::test]
    async fn test_transport_error_is_bad_gateway() {
        let payer = Pubkey::new_unique();
        let tx = legacy_transaction(
            &[system_instruction::transfer(&payer, &Pubkey::new_unique(), 1_000)],
            &payer,
        );

        let response = router(MockProvider::unreachable())
            .oneshot(post_json("/simulate", serde_json::json!({ "transaction": encode(&tx) })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_status_mapping() {
        use solana_client::client_error::{ClientError, ClientErrorKind};

        let transport = SimLensError::Transport(ClientError::from(ClientErrorKind::Custom(
            "connection refused".to_string(),
        )));
        assert_eq!(AppError(transport).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError(SimLensError::address_table("gone")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError(SimLensError::decode("bad")).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
