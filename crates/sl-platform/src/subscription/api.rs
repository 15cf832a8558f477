//! Subscriptions API
//!
//! REST endpoints for subscription management and cost aggregation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::shared::api_common::SuccessResponse;
use crate::shared::error::PlatformError;
use crate::subscription::entity::{NewSubscription, Subscription};
use crate::subscription::service::SubscriptionService;

/// Create/update subscription request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Service name (free text)
    pub service_name: String,

    /// Cost in minor currency units
    pub price: i32,

    /// Owning user
    pub user_id: Uuid,

    /// First day of the active interval
    pub start_date: NaiveDate,

    /// Last day of the active interval; omit for no end
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl From<SubscriptionRequest> for NewSubscription {
    fn from(req: SubscriptionRequest) -> Self {
        Self {
            service_name: req.service_name,
            price: req.price,
            user_id: req.user_id,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// Subscription response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: s.start_date,
            end_date: s.end_date,
        }
    }
}

/// Query parameters for the subscriptions list
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Owner whose subscriptions to list
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

/// Query parameters for the total-cost aggregation
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    /// Owner whose subscriptions to aggregate
    #[serde(rename = "userID")]
    pub user_id: Uuid,

    /// Calendar month, 1-12
    pub month: u32,

    /// Calendar year
    pub year: i32,

    /// Case-insensitive service-name substring; empty matches everything
    #[serde(default)]
    pub service_filter: String,
}

/// Total-cost response
#[derive(Debug, Serialize, ToSchema)]
pub struct TotalCostResponse {
    pub total: i64,
}

/// Subscriptions service state
#[derive(Clone)]
pub struct SubscriptionsState {
    pub service: Arc<SubscriptionService>,
}

/// Create a new subscription
#[utoipa::path(
    post,
    path = "",
    tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_subscription(
    State(state): State<SubscriptionsState>,
    Json(req): Json<SubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), PlatformError> {
    let created = state.service.create(&req.into()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get subscription by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "subscriptions",
    params(
        ("id" = i64, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn get_subscription(
    State(state): State<SubscriptionsState>,
    Path(id): Path<i64>,
) -> Result<Json<SubscriptionResponse>, PlatformError> {
    let sub = state
        .service
        .get(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Subscription", id))?;

    Ok(Json(sub.into()))
}

/// List a user's subscriptions
#[utoipa::path(
    get,
    path = "",
    tag = "subscriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "List of subscriptions", body = Vec<SubscriptionResponse>),
        (status = 400, description = "Missing or malformed userID")
    )
)]
pub async fn list_subscriptions(
    State(state): State<SubscriptionsState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, PlatformError> {
    let subs = state.service.list(query.user_id).await?;
    Ok(Json(subs.into_iter().map(|s| s.into()).collect()))
}

/// Update subscription
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "subscriptions",
    params(
        ("id" = i64, Path, description = "Subscription ID")
    ),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn update_subscription(
    State(state): State<SubscriptionsState>,
    Path(id): Path<i64>,
    Json(req): Json<SubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, PlatformError> {
    let updated = state.service.update(id, &req.into()).await?;
    Ok(Json(updated.into()))
}

/// Delete subscription
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "subscriptions",
    params(
        ("id" = i64, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription deleted", body = SuccessResponse),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn delete_subscription(
    State(state): State<SubscriptionsState>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.service.delete(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Total cost of a user's subscriptions overlapping a calendar month
#[utoipa::path(
    get,
    path = "/total",
    tag = "subscriptions",
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Aggregated cost", body = TotalCostResponse),
        (status = 400, description = "Malformed userID, month, or year")
    )
)]
pub async fn total_cost(
    State(state): State<SubscriptionsState>,
    Query(query): Query<TotalCostQuery>,
) -> Result<Json<TotalCostResponse>, PlatformError> {
    if !(1..=12).contains(&query.month) {
        return Err(PlatformError::validation(format!(
            "month must be 1-12, got {}",
            query.month
        )));
    }

    let total = state
        .service
        .total_cost(query.user_id, query.year, query.month, &query.service_filter)
        .await?;

    Ok(Json(TotalCostResponse { total }))
}

/// Create subscriptions router
pub fn subscriptions_router(state: SubscriptionsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_subscription, list_subscriptions))
        .routes(routes!(total_cost))
        .routes(routes!(
            get_subscription,
            update_subscription,
            delete_subscription
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::memory::InMemorySubscriptionStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let service = Arc::new(SubscriptionService::new(store));
        let (router, _openapi) = OpenApiRouter::new()
            .nest("/subscriptions", subscriptions_router(SubscriptionsState { service }))
            .split_for_parts();
        router
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn netflix(user: Uuid) -> Value {
        json!({
            "serviceName": "Netflix",
            "price": 500,
            "userId": user,
            "startDate": "2024-01-01"
        })
    }

    #[tokio::test]
    async fn create_returns_201_with_assigned_id() {
        let app = test_app();
        let user = Uuid::new_v4();

        let (status, body) = send(&app, post_json("/subscriptions", netflix(user))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap() >= 1);
        assert_eq!(body["serviceName"], "Netflix");
        assert_eq!(body["price"], 500);
        assert_eq!(body["userId"], user.to_string());
        // No endDate was sent, so none comes back
        assert!(body.get("endDate").is_none());
    }

    #[tokio::test]
    async fn create_rejects_inverted_interval() {
        let app = test_app();
        let body = json!({
            "serviceName": "Netflix",
            "price": 500,
            "userId": Uuid::new_v4(),
            "startDate": "2024-05-10",
            "endDate": "2024-05-09"
        });

        let (status, body) = send(&app, post_json("/subscriptions", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn get_round_trips_created_subscription() {
        let app = test_app();
        let user = Uuid::new_v4();

        let (_, created) = send(&app, post_json("/subscriptions", netflix(user))).await;
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, get(&format!("/subscriptions/{id}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_missing_returns_404() {
        let app = test_app();

        let (status, body) = send(&app, get("/subscriptions/9999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn list_requires_user_id() {
        let app = test_app();

        let (status, _) = send(&app, get("/subscriptions")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/subscriptions?userID=not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_returns_only_the_users_records() {
        let app = test_app();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        send(&app, post_json("/subscriptions", netflix(alice))).await;
        send(&app, post_json("/subscriptions", netflix(bob))).await;

        let (status, body) = send(&app, get(&format!("/subscriptions?userID={alice}"))).await;

        assert_eq!(status, StatusCode::OK);
        let subs = body.as_array().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0]["userId"], alice.to_string());

        let (status, body) =
            send(&app, get(&format!("/subscriptions?userID={}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_404s_on_missing() {
        let app = test_app();
        let user = Uuid::new_v4();

        let (_, created) = send(&app, post_json("/subscriptions", netflix(user))).await;
        let id = created["id"].as_i64().unwrap();

        let replacement = json!({
            "serviceName": "Netflix Premium",
            "price": 900,
            "userId": user,
            "startDate": "2024-02-01"
        });
        let (status, body) =
            send(&app, put_json(&format!("/subscriptions/{id}"), replacement.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serviceName"], "Netflix Premium");
        assert_eq!(body["price"], 900);
        assert_eq!(body["id"], id);

        let (status, _) =
            send(&app, put_json(&format!("/subscriptions/{}", id + 50), replacement)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_record_and_404s_on_missing() {
        let app = test_app();
        let user = Uuid::new_v4();

        let (_, created) = send(&app, post_json("/subscriptions", netflix(user))).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, delete(&format!("/subscriptions/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, get(&format!("/subscriptions/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, delete(&format!("/subscriptions/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn total_aggregates_with_optional_filter() {
        let app = test_app();
        let user = Uuid::new_v4();

        send(&app, post_json("/subscriptions", netflix(user))).await;
        send(
            &app,
            post_json(
                "/subscriptions",
                json!({
                    "serviceName": "Spotify",
                    "price": 200,
                    "userId": user,
                    "startDate": "2024-01-01"
                }),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            get(&format!(
                "/subscriptions/total?userID={user}&month=3&year=2024&serviceFilter=net"
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "total": 500 }));

        // serviceFilter omitted entirely: no restriction
        let (status, body) = send(
            &app,
            get(&format!("/subscriptions/total?userID={user}&month=3&year=2024")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "total": 700 }));
    }

    #[tokio::test]
    async fn total_is_zero_when_nothing_matches() {
        let app = test_app();

        let (status, body) = send(
            &app,
            get(&format!(
                "/subscriptions/total?userID={}&month=3&year=2024",
                Uuid::new_v4()
            )),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "total": 0 }));
    }

    #[tokio::test]
    async fn total_rejects_out_of_range_month() {
        let app = test_app();
        let user = Uuid::new_v4();

        let (status, body) = send(
            &app,
            get(&format!("/subscriptions/total?userID={user}&month=13&year=2024")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            get(&format!("/subscriptions/total?userID={user}&month=0&year=2024")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
