use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use dashmap::DashMap;
use http_body_util::BodyExt as _;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";
pub const REPLAYED_HEADER: &str = "idempotent-replayed";

/// Returns the caller's key when it is non-blank, otherwise a fresh UUID.
pub fn ensure_idempotency_key(header: Option<&str>) -> String {
    match header.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Stored responses keyed by method, path and caller key, so one key reused
/// on two endpoints never replays the other endpoint's response.
#[derive(Clone)]
pub struct IdempotencyStore {
    entries: Arc<DashMap<String, StoredResponse>>,
    ttl: Duration,
}

impl IdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, scope: &str) -> Option<StoredResponse> {
        self.entries
            .get(scope)
            .filter(|sr| sr.stored_at.elapsed() < self.ttl)
            .map(|sr| sr.clone())
    }

    pub fn insert(&self, scope: &str, sr: StoredResponse) {
        self.entries.insert(scope.to_string(), sr);
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries.retain(|_, sr| now.duration_since(sr.stored_at) < ttl);
    }
}

fn replay_scope(req: &Request, key: &str) -> String {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    format!("{} {} {}", req.method(), path, key)
}

#[derive(Clone)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: Option<HeaderValue>,
    pub stored_at: Instant,
}

/// Replays the stored response for a repeated `Idempotency-Key` on mutating
/// requests. Only successful responses are stored, so a failed booking can be
/// retried with the same key. Every response echoes the key in use.
pub async fn idempotency_middleware(
    State(store): State<IdempotencyStore>,
    req: Request,
    next: Next,
) -> Response {
    let is_mutating = matches!(req.method().as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let supplied = req
        .headers()
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let key = ensure_idempotency_key(supplied.as_deref());

    store.cleanup();

    let replayable = is_mutating && supplied.is_some();
    let scope = replay_scope(&req, &key);

    if replayable {
        if let Some(stored) = store.get(&scope) {
            tracing::info!(idempotency_key = %key, "replaying stored response");
            let mut resp = Response::new(axum::body::Body::from(stored.body.clone()));
            *resp.status_mut() = stored.status;
            if let Some(ct) = stored.content_type.clone() {
                resp.headers_mut()
                    .insert(HeaderName::from_static("content-type"), ct);
            }
            resp.headers_mut().insert(
                HeaderName::from_static(REPLAYED_HEADER),
                HeaderValue::from_static("true"),
            );
            attach_key(&mut resp, &key);
            return resp;
        }
    }

    let resp = next.run(req).await;

    if !replayable || !resp.status().is_success() {
        let mut resp = resp;
        attach_key(&mut resp, &key);
        return resp;
    }

    let (parts, body) = resp.into_parts();
    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            store.insert(
                &scope,
                StoredResponse {
                    status: parts.status,
                    body: bytes.clone(),
                    content_type: parts.headers.get("content-type").cloned(),
                    stored_at: Instant::now(),
                },
            );
            let mut resp = Response::from_parts(parts, axum::body::Body::from(bytes));
            attach_key(&mut resp, &key);
            resp
        }
        Err(_) => Response::from_parts(parts, axum::body::Body::empty()),
    }
}

fn attach_key(resp: &mut Response, key: &str) {
    if let Ok(value) = HeaderValue::from_str(key) {
        resp.headers_mut()
            .insert(HeaderName::from_static(IDEMPOTENCY_HEADER), value);
    }
}
