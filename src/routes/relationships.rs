use crate::core::{self, prompts, queue, transitions};
use crate::models::{
    BuildQueueRequest, BuildQueueResponse, ConnectionRequestBody, ConnectionRequestResponse,
    ErrorResponse, ExclusionSets, HealthResponse, ListRelationshipsResponse, PromptStateRequest,
    PromptDecisionResponse, RelationshipAction, RelationshipActionRequest,
    RelationshipActionResponse, RelationshipStatus,
};
use crate::services::{
    CacheManager, ConnectionRequest, CoordinatorError, CoordinatorService, RelationshipStore,
};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

const ALL_STATUSES: [RelationshipStatus; 7] = [
    RelationshipStatus::Recommended,
    RelationshipStatus::Perhaps,
    RelationshipStatus::Pending,
    RelationshipStatus::Saved,
    RelationshipStatus::Connected,
    RelationshipStatus::Passed,
    RelationshipStatus::Removed,
];

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RelationshipStore>,
    pub cache: Arc<CacheManager>,
    pub coordinator: Arc<CoordinatorService>,
}

/// Configure all relationship routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/queue", web::post().to(build_queue))
        .route("/queue/exclusions", web::get().to(get_exclusions))
        .route("/relationships", web::get().to(list_relationships))
        .route("/relationships/action", web::post().to(apply_action))
        .route("/relationships/request", web::post().to(send_request))
        .route("/prompts/evaluate", web::post().to(evaluate_prompts));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Build the recommendation queue
///
/// POST /api/v1/queue
///
/// Sweeps expired temporal states, fetches the authoritative record set,
/// rebuilds the exclusion-set cache wholesale, and renders the queue as a
/// pure function of that snapshot. A sweep failure is logged and skipped; it
/// never blocks rendering.
async fn build_queue(
    state: web::Data<AppState>,
    req: web::Json<BuildQueueRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for queue build: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let owner_id = &req.owner_id;
    let now = chrono::Utc::now();

    tracing::info!("Building queue for owner: {}", owner_id);

    // Lazy sweep before every read; retried on the next load on failure
    let swept_count = match state.store.sweep_expired(owner_id, now).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Sweep failed for {}, serving possibly stale queue: {}", owner_id, e);
            0
        }
    };

    let mut records = match state.store.fetch_by_owner(owner_id, &ALL_STATUSES).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to fetch records for {}: {}", owner_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch relationships".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // If the DB sweep was skipped the snapshot may still hold lapsed rows;
    // apply the same rewrite in memory so the rendered queue is consistent.
    core::sweep_snapshot(&mut records, now);

    // The fetch is authoritative: rebuild the cached sets wholesale
    let exclusions = ExclusionSets::from_records(&records);
    if let Err(e) = state.cache.store_exclusion_sets(owner_id, &exclusions).await {
        tracing::warn!("Failed to refresh exclusion cache for {}: {}", owner_id, e);
    }

    let view = queue::build_queue(&records, &exclusions, req.focus_counterpart_id.as_deref());
    let cursor = queue::clamp_cursor(req.cursor, view.real_count);

    tracing::info!(
        "Queue built for {}: {} real candidates, {} entries, cursor {}",
        owner_id,
        view.real_count,
        view.entries.len(),
        cursor
    );

    HttpResponse::Ok().json(BuildQueueResponse {
        owner_id: owner_id.clone(),
        real_count: view.real_count,
        entries: view.entries,
        cursor,
        swept_count,
    })
}

/// Apply a lifecycle action (defer, reject, remove)
///
/// POST /api/v1/relationships/action
///
/// A missing record or a lost conditional-write race is reported as an
/// applied=false no-op, never as an error: the record was already resolved.
async fn apply_action(
    state: web::Data<AppState>,
    req: web::Json<RelationshipActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let action = match req.action.to_lowercase().as_str() {
        "defer" => RelationshipAction::Defer,
        "reject" => RelationshipAction::Reject,
        "remove" => RelationshipAction::Remove,
        // Connection requests go through the coordinator endpoint
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid action".to_string(),
                message: "Action must be one of: defer, reject, remove".to_string(),
                status_code: 400,
            });
        }
    };

    let record = match state.store.fetch_one(&req.owner_id, &req.counterpart_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            // Already resolved elsewhere; nothing to do
            tracing::debug!(
                "Record {} -> {} missing, treating {} as no-op",
                req.owner_id,
                req.counterpart_id,
                req.action
            );
            return HttpResponse::Ok().json(RelationshipActionResponse {
                success: true,
                applied: false,
                new_status: None,
                action_id: uuid::Uuid::new_v4().to_string(),
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch record: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch record".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // Central transition validation before any write
    let transition = match transitions::apply(record.status, action) {
        Ok(t) => t,
        Err(e) => {
            tracing::info!(
                "Rejected transition for {} -> {}: {}",
                req.owner_id,
                req.counterpart_id,
                e
            );
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Illegal transition".to_string(),
                message: e.to_string(),
                status_code: 409,
            });
        }
    };

    let now = chrono::Utc::now();
    let applied = match action {
        RelationshipAction::Defer => {
            state
                .store
                .mark_deferred(&req.owner_id, &req.counterpart_id, now)
                .await
        }
        RelationshipAction::Reject => {
            state
                .store
                .mark_passed(&req.owner_id, &req.counterpart_id, now)
                .await
        }
        RelationshipAction::Remove => {
            state
                .store
                .mark_removed(&req.owner_id, &req.counterpart_id, &req.owner_id, now)
                .await
        }
        RelationshipAction::Request => unreachable!("request is handled by its own endpoint"),
    };

    match applied {
        Ok(applied) => {
            if !applied {
                // Lost a conditional-write race; the winner already moved the row
                tracing::debug!(
                    "Conditional update matched zero rows for {} -> {}",
                    req.owner_id,
                    req.counterpart_id
                );
            }

            if let Err(e) = state.cache.invalidate_owner(&req.owner_id).await {
                tracing::warn!("Failed to invalidate cache for {}: {}", req.owner_id, e);
            }

            HttpResponse::Ok().json(RelationshipActionResponse {
                success: true,
                applied,
                new_status: applied.then_some(transition.to),
                action_id: uuid::Uuid::new_v4().to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to apply {}: {}", req.action, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to apply action".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Send a connection request through the Coordinator
///
/// POST /api/v1/relationships/request
///
/// No optimistic state change is applied before the coordinator resolves;
/// the returned result decides whether the requester's row is `connected`
/// immediately or stays `pending` awaiting reciprocation.
async fn send_request(
    state: web::Data<AppState>,
    req: web::Json<ConnectionRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if req.requester_id == req.target_id {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: "Cannot request a connection with yourself".to_string(),
            status_code: 400,
        });
    }

    let request = ConnectionRequest {
        requester_id: req.requester_id.clone(),
        target_id: req.target_id.clone(),
        message: req.message.clone(),
    };

    let outcome = match state.coordinator.resolve(&request).await {
        Ok(outcome) => outcome,
        Err(CoordinatorError::NotFound(msg)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Record not found".to_string(),
                message: msg,
                status_code: 404,
            });
        }
        Err(CoordinatorError::Conflict(msg)) => {
            // Resolved by the other party in the meantime; the client must
            // refetch and reconcile rather than blindly overwrite
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Already resolved".to_string(),
                message: msg,
                status_code: 409,
            });
        }
        Err(CoordinatorError::Transient(e)) => {
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Coordinator unreachable".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
        Err(e) => {
            tracing::error!("Coordinator error for {} -> {}: {}", req.requester_id, req.target_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Coordinator error".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // A remote coordinator only returns the result; mirror it onto the
    // requester's row. The local resolver already wrote both rows.
    if !state.coordinator.is_local() {
        if let Err(e) = state
            .store
            .apply_request_outcome(&req.requester_id, &req.target_id, outcome, chrono::Utc::now())
            .await
        {
            tracing::error!("Failed to apply coordinator outcome: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to apply outcome".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    }

    for user in [&req.requester_id, &req.target_id] {
        if let Err(e) = state.cache.invalidate_owner(user).await {
            tracing::warn!("Failed to invalidate cache for {}: {}", user, e);
        }
    }

    tracing::info!(
        "Connection request {} -> {} resolved as {:?}",
        req.requester_id,
        req.target_id,
        outcome
    );

    HttpResponse::Ok().json(ConnectionRequestResponse { result: outcome })
}

/// List relationship records for bucket views
///
/// GET /api/v1/relationships?ownerId={ownerId}&statuses=saved,connected&focusCounterpartId={id}
///
/// An optional focus counterpart moves to the front of the listing so a
/// deep-linked saved contact opens at the top of its bucket.
async fn list_relationships(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let owner_id = match query.get("ownerId") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing ownerId parameter".to_string(),
                message: "ownerId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    let statuses: Vec<RelationshipStatus> = match query.get("statuses") {
        Some(raw) => {
            let parsed: Option<Vec<_>> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(RelationshipStatus::parse)
                .collect();
            match parsed {
                Some(statuses) if !statuses.is_empty() => statuses,
                _ => {
                    return HttpResponse::BadRequest().json(ErrorResponse {
                        error: "Invalid statuses parameter".to_string(),
                        message: format!("Unrecognized status in: {}", raw),
                        status_code: 400,
                    });
                }
            }
        }
        None => ALL_STATUSES.to_vec(),
    };

    match state.store.fetch_by_owner(owner_id, &statuses).await {
        Ok(mut records) => {
            if let Some(focus) = query.get("focusCounterpartId") {
                queue::promote_focus(&mut records, |r| &r.counterpart_id == focus);
            }

            HttpResponse::Ok().json(ListRelationshipsResponse {
                owner_id: owner_id.clone(),
                count: records.len(),
                records,
            })
        }
        Err(e) => {
            tracing::error!("Failed to list relationships for {}: {}", owner_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list relationships".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get the cached exclusion id-sets for an owner
///
/// GET /api/v1/queue/exclusions?ownerId={ownerId}
///
/// Serves the accelerator sets so a client can pre-filter its local queue
/// before the authoritative fetch completes. Missing or corrupt cache entries
/// degrade to empty sets; this endpoint never fails on cache state.
async fn get_exclusions(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let owner_id = match query.get("ownerId") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing ownerId parameter".to_string(),
                message: "ownerId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    let sets = state.cache.exclusion_sets(owner_id).await;

    HttpResponse::Ok().json(serde_json::json!({
        "ownerId": owner_id,
        "passed": sets.passed,
        "saved": sets.saved,
        "pending": sets.pending,
    }))
}

/// Evaluate engagement prompt gating for a session
///
/// POST /api/v1/prompts/evaluate
async fn evaluate_prompts(req: web::Json<PromptStateRequest>) -> impl Responder {
    let state = prompts::PromptState {
        engagement_count: req.engagement_count,
        share_prompt_shown_once: req.share_prompt_shown_once,
        last_share_week: req.last_share_week,
        last_fresh_start_date: req.last_fresh_start_date,
    };

    let decision = prompts::evaluate(&state, chrono::Utc::now());

    HttpResponse::Ok().json(PromptDecisionResponse {
        show_share_prompt: decision.show_share_prompt,
        show_fresh_start_banner: decision.show_fresh_start_banner,
    })
}
