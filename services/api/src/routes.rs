use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use card_scout::allocation::{
    compute_optimal_plan, AllocationFilter, AllocationPlan, MAX_CARDS_LIMIT,
};
use card_scout::catalog::{Card, CardCatalog};
use card_scout::recommend::{
    rank, CardEvaluation, IssuerRule, Preferences, RankedResults, ScoringEngine,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RecommendationRequest {
    pub(crate) preferences: Preferences,
    /// Cards the user already holds; they are never recommended.
    #[serde(alias = "owned_cards")]
    pub(crate) excluded_names: Vec<String>,
    /// Dates the user opened recent cards, used to derive issuer rules.
    pub(crate) opened_cards: Vec<NaiveDate>,
    pub(crate) today: Option<NaiveDate>,
    pub(crate) include_evaluations: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationResponse {
    #[serde(flatten)]
    pub(crate) results: RankedResults,
    pub(crate) issuer_rules: Vec<IssuerRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) evaluations: Option<Vec<CardEvaluation>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllocationRequest {
    pub(crate) budget: f64,
    #[serde(default)]
    pub(crate) max_cards: Option<i64>,
    #[serde(default)]
    pub(crate) filter: AllocationFilter,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllocationResponse {
    pub(crate) budget: f64,
    pub(crate) max_cards: i64,
    pub(crate) plan: AllocationPlan,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) count: usize,
    pub(crate) cards: Vec<Card>,
}

/// Card endpoints bound to a loaded catalog.
pub(crate) fn card_router(catalog: Arc<CardCatalog>) -> Router {
    Router::new()
        .route("/api/v1/cards", get(catalog_endpoint))
        .route("/api/v1/recommendations", post(recommendations_endpoint))
        .route("/api/v1/allocation/plan", post(allocation_endpoint))
        .with_state(catalog)
}

pub(crate) fn with_card_routes(catalog: Arc<CardCatalog>) -> Router {
    card_router(catalog)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_endpoint(State(catalog): State<Arc<CardCatalog>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        count: catalog.len(),
        cards: catalog.cards().to_vec(),
    })
}

pub(crate) async fn recommendations_endpoint(
    State(catalog): State<Arc<CardCatalog>>,
    Json(payload): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let RecommendationRequest {
        preferences,
        excluded_names,
        opened_cards,
        today,
        include_evaluations,
    } = payload;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let preferences = preferences.with_derived_rules(&opened_cards, today);
    let results = rank(catalog.cards(), &preferences, &excluded_names);

    let evaluations = include_evaluations.then(|| {
        let engine = ScoringEngine::new(&preferences, &excluded_names);
        catalog
            .cards()
            .iter()
            .map(|card| engine.evaluate(card))
            .collect()
    });

    info!(
        card_mode = results.card_mode.label(),
        primary = results.primary.len(),
        other_type = results.other_type.len(),
        "recommendations served"
    );

    Json(RecommendationResponse {
        results,
        issuer_rules: preferences.issuer_rules,
        evaluations,
    })
}

pub(crate) async fn allocation_endpoint(
    State(catalog): State<Arc<CardCatalog>>,
    Json(payload): Json<AllocationRequest>,
) -> Json<AllocationResponse> {
    let AllocationRequest {
        budget,
        max_cards,
        filter,
    } = payload;

    let max_cards = max_cards.unwrap_or(MAX_CARDS_LIMIT as i64);
    let pool = filter.apply(catalog.cards());
    let plan = compute_optimal_plan(&pool, budget, max_cards).sorted_for_display();

    info!(
        pool = pool.len(),
        chosen = plan.entries.len(),
        total_bonus = plan.total_bonus,
        "allocation plan served"
    );

    Json(AllocationResponse {
        budget,
        max_cards,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn catalog() -> Arc<CardCatalog> {
        Arc::new(CardCatalog::bundled().expect("bundled catalog parses"))
    }

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_card_routes(catalog()).layer(Extension(state))
    }

    async fn read_json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn recommendations_endpoint_ranks_the_catalog() {
        let request: RecommendationRequest = serde_json::from_value(json!({
            "preferences": {
                "goals": ["Cashback", "Everyday"],
                "fee_tolerance": "None"
            },
            "owned_cards": ["Wells Fargo Active Cash"],
            "include_evaluations": true
        }))
        .expect("request deserializes");

        let Json(body) = recommendations_endpoint(State(catalog()), Json(request)).await;

        assert!(!body.results.primary.is_empty());
        assert!(body
            .results
            .primary
            .iter()
            .all(|scored| scored.card.name != "Wells Fargo Active Cash"));
        let evaluations = body.evaluations.expect("evaluations requested");
        assert_eq!(evaluations.len(), catalog().len());
        assert!(body.issuer_rules.is_empty());
    }

    #[tokio::test]
    async fn recommendations_endpoint_derives_issuer_rules() {
        let request: RecommendationRequest = serde_json::from_value(json!({
            "preferences": { "goals": ["Bonus"] },
            "opened_cards": ["2025-09-20", "2025-08-30"],
            "today": "2025-10-01"
        }))
        .expect("request deserializes");

        let Json(body) = recommendations_endpoint(State(catalog()), Json(request)).await;

        assert_eq!(
            body.issuer_rules,
            vec![IssuerRule::TwoInSixtyDays, IssuerRule::TwoInNinetyDays]
        );
        assert!(body
            .results
            .primary
            .iter()
            .all(|scored| scored.card.issuer != "Amex" && scored.card.issuer != "Citi"));
        assert!(body.evaluations.is_none());
    }

    #[tokio::test]
    async fn allocation_route_returns_display_sorted_plan() {
        let response = app(true)
            .oneshot(post_json(
                "/api/v1/allocation/plan",
                json!({ "budget": 20000, "max_cards": 4 }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["max_cards"], 4);
        let total_spend = payload["plan"]["total_spend"].as_u64().expect("spend");
        assert!(total_spend <= 20_000);
        let entries = payload["plan"]["entries"].as_array().expect("entries");
        assert!(!entries.is_empty() && entries.len() <= 4);
        let last_chase = entries
            .iter()
            .rposition(|entry| entry["card"]["issuer"] == "Chase");
        let first_other = entries
            .iter()
            .position(|entry| entry["card"]["issuer"] != "Chase");
        if let (Some(last_chase), Some(first_other)) = (last_chase, first_other) {
            assert!(last_chase < first_other);
        }
    }

    #[tokio::test]
    async fn allocation_route_applies_filters() {
        let response = app(true)
            .oneshot(post_json(
                "/api/v1/allocation/plan",
                json!({
                    "budget": 100000,
                    "filter": { "card_type": "business", "rewards": "General" }
                }),
            ))
            .await
            .expect("route executes");

        let payload = read_json_body(response).await;
        assert_eq!(payload["max_cards"], MAX_CARDS_LIMIT as i64);
        let entries = payload["plan"]["entries"].as_array().expect("entries");
        assert!(!entries.is_empty());
        assert!(entries
            .iter()
            .all(|entry| entry["card"]["card_type"] == "business"));
    }

    #[tokio::test]
    async fn malformed_allocation_payload_is_rejected() {
        let response = app(true)
            .oneshot(post_json("/api/v1/allocation/plan", json!({ "max_cards": 3 })))
            .await
            .expect("route executes");

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn catalog_route_lists_cards() {
        let response = app(true)
            .oneshot(Request::get("/api/v1/cards").body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");

        let payload = read_json_body(response).await;
        let count = payload["count"].as_u64().expect("count") as usize;
        assert_eq!(count, catalog().len());
        assert_eq!(payload["cards"].as_array().map(Vec::len), Some(count));
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");
        assert_eq!(read_json_body(response).await["status"], "ok");
    }
}
