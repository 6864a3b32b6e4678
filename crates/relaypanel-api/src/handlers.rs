use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use relaypanel_grants::{normalize, validate, Grant, GrantUpdate, OpCode, PortValue};

use crate::models::*;
use crate::store::StoreError;
use crate::AppState;

/// List grants, filtered and paginated for the console table.
#[utoipa::path(
    get,
    path = "/tokens",
    params(GrantQuery),
    responses(
        (status = 200, description = "Page of grants", body = TokenListResponse)
    ),
    tag = "grants"
)]
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GrantQuery>,
) -> Json<TokenListResponse> {
    debug!("listing grants with filters: {:?}", query);

    let mut grants: Vec<Grant> = state
        .store
        .list()
        .await
        .into_iter()
        .filter(|g| matches_query(g, &query))
        .collect();

    let count = grants.len();

    if let Some(limit) = query.limit {
        let page = query.page.unwrap_or(1).max(1);
        let start = (page - 1).saturating_mul(limit).min(count);
        let end = start.saturating_add(limit).min(count);
        grants = grants[start..end].to_vec();
    }

    Json(TokenListResponse {
        code: 0,
        msg: "query tokens success".to_string(),
        count,
        data: grants,
    })
}

fn matches_query(grant: &Grant, query: &GrantQuery) -> bool {
    let contains = |haystack: &str, needle: &Option<String>| -> bool {
        match needle {
            Some(needle) => {
                let stripped: String = needle.chars().filter(|c| !c.is_whitespace()).collect();
                stripped.is_empty() || haystack.contains(&stripped)
            }
            None => true,
        }
    };

    contains(&grant.user, &query.user)
        && contains(&grant.token, &query.token)
        && contains(&grant.comment, &query.comment)
        && query
            .server
            .as_deref()
            .map_or(true, |server| server.is_empty() || grant.server == server)
}

/// Create a grant.
#[utoipa::path(
    post,
    path = "/add",
    request_body = Grant,
    responses(
        (status = 200, description = "Operation result, success=false carries a result code", body = OperationResponse)
    ),
    tag = "grants"
)]
pub async fn add_token(
    State(state): State<Arc<AppState>>,
    Json(mut grant): Json<Grant>,
) -> Json<OperationResponse> {
    clean_grant(&mut grant);
    grant.create_date = now_stamp();
    grant.enable = true;

    if let Err(code) = verify_user_format(&grant) {
        return reject("add", &grant.user, code);
    }
    if state.store.contains(&grant.user).await {
        return reject("add", &grant.user, OpCode::UserExists);
    }
    if let Err(code) = verify_field_formats(&grant) {
        return reject("add", &grant.user, code);
    }

    match state.store.insert(grant.clone()).await {
        Ok(()) => {
            info!("grant added for user [{}]", grant.user);
            Json(OperationResponse::success("user add success"))
        }
        Err(StoreError::Exists(_)) => reject("add", &grant.user, OpCode::UserExists),
        Err(_) => reject("add", &grant.user, OpCode::SaveError),
    }
}

/// Update a grant from before/after snapshots; the stored record must still
/// match `before` for the replace to go through.
#[utoipa::path(
    post,
    path = "/update",
    request_body = GrantUpdate,
    responses(
        (status = 200, description = "Operation result, success=false carries a result code", body = OperationResponse)
    ),
    tag = "grants"
)]
pub async fn update_tokens(
    State(state): State<Arc<AppState>>,
    Json(update): Json<GrantUpdate>,
) -> Json<OperationResponse> {
    let GrantUpdate { before, mut after } = update;

    if before.user != after.user {
        warn!(
            "update rejected, user changed: before [{}], after [{}]",
            before.user, after.user
        );
        return reject("update", &before.user, OpCode::ParamError);
    }

    if let Err(code) = verify_user_format(&after) {
        return reject("update", &after.user, code);
    }
    if !state.store.contains(&after.user).await {
        return reject("update", &after.user, OpCode::UserNotFound);
    }
    if let Err(code) = verify_field_formats(&after) {
        return reject("update", &after.user, code);
    }

    clean_grant(&mut after);
    // the creation date never changes across edits
    after.create_date = before.create_date.clone();

    match state.store.replace(&before, after.clone()).await {
        Ok(()) => {
            info!("grant updated for user [{}]", after.user);
            Json(OperationResponse::success("user update success"))
        }
        Err(StoreError::NotFound(_)) => reject("update", &after.user, OpCode::UserNotFound),
        Err(_) => reject("update", &after.user, OpCode::ParamError),
    }
}

/// Remove the listed users.
#[utoipa::path(
    post,
    path = "/remove",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Operation result, success=false carries a result code", body = OperationResponse)
    ),
    tag = "grants"
)]
pub async fn remove_tokens(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkRequest>,
) -> Json<OperationResponse> {
    let users = user_names(&request);
    match state.store.remove(&users).await {
        Ok(()) => {
            info!("removed grants: {:?}", users);
            Json(OperationResponse::success("user remove success"))
        }
        Err(StoreError::NotFound(user)) => reject("remove", &user, OpCode::UserNotFound),
        Err(_) => reject("remove", "", OpCode::ParamError),
    }
}

/// Enable the listed users.
#[utoipa::path(
    post,
    path = "/enable",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Operation result, success=false carries a result code", body = OperationResponse)
    ),
    tag = "grants"
)]
pub async fn enable_tokens(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkRequest>,
) -> Json<OperationResponse> {
    set_enabled(state, request, true).await
}

/// Disable the listed users.
#[utoipa::path(
    post,
    path = "/disable",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Operation result, success=false carries a result code", body = OperationResponse)
    ),
    tag = "grants"
)]
pub async fn disable_tokens(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkRequest>,
) -> Json<OperationResponse> {
    set_enabled(state, request, false).await
}

async fn set_enabled(
    state: Arc<AppState>,
    request: BulkRequest,
    enable: bool,
) -> Json<OperationResponse> {
    let operation = if enable { "enable" } else { "disable" };
    let users = user_names(&request);
    match state.store.set_enabled(&users, enable).await {
        Ok(()) => {
            info!("{}d grants: {:?}", operation, users);
            Json(OperationResponse::success(format!(
                "user {} success",
                operation
            )))
        }
        Err(StoreError::NotFound(user)) => reject(operation, &user, OpCode::UserNotFound),
        Err(_) => reject(operation, "", OpCode::ParamError),
    }
}

/// High-water port mark for one server.
#[utoipa::path(
    get,
    path = "/get_max_port",
    params(MaxPortQuery),
    responses(
        (status = 200, description = "Maximum granted port on the server", body = MaxPortResponse),
        (status = 400, description = "Missing server name", body = OperationResponse)
    ),
    tag = "ports"
)]
pub async fn get_max_port(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MaxPortQuery>,
) -> Result<Json<MaxPortResponse>, (StatusCode, Json<OperationResponse>)> {
    if query.server.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(OperationResponse::failure(
                OpCode::ParamError,
                "server name is required",
            )),
        ));
    }

    let max_port = state.store.max_port(&query.server).await;
    debug!("max port on [{}] is {}", query.server, max_port);

    Ok(Json(MaxPortResponse {
        success: true,
        max_port,
        message: "get max port success".to_string(),
    }))
}

/// High-water port marks for every server with grants.
#[utoipa::path(
    get,
    path = "/get_all_max_ports",
    responses(
        (status = 200, description = "Per-server maximum granted ports", body = AllMaxPortsResponse)
    ),
    tag = "ports"
)]
pub async fn get_all_max_ports(State(state): State<Arc<AppState>>) -> Json<AllMaxPortsResponse> {
    let max_ports_map = state.store.max_ports().await;

    Json(AllMaxPortsResponse {
        success: true,
        max_ports_map,
        message: "get all max ports success".to_string(),
    })
}

/// Known backend servers.
#[utoipa::path(
    get,
    path = "/dashboards",
    responses(
        (status = 200, description = "Server records and the active index", body = DashboardsResponse)
    ),
    tag = "servers"
)]
pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> Json<DashboardsResponse> {
    Json(DashboardsResponse {
        code: 0,
        data: state.dashboards.clone(),
        current_index: state.current_index,
    })
}

fn user_names(request: &BulkRequest) -> Vec<String> {
    request.users.iter().map(|g| g.user.clone()).collect()
}

fn reject(operation: &str, user: &str, code: OpCode) -> Json<OperationResponse> {
    let message = format!("user {} failed, {} [{}]", operation, code.message(), user);
    warn!("{}", message);
    Json(OperationResponse::failure(code, message))
}

/// Trim stray whitespace off every text field, as the console's own
/// normalization would have done.
fn clean_grant(grant: &mut Grant) {
    grant.comment = grant.comment.trim().to_string();
    grant.server = grant.server.trim().to_string();
    grant.expire_date = grant.expire_date.trim().to_string();
    for port in &mut grant.ports {
        if let PortValue::Text(text) = port {
            *text = text.trim().to_string();
        }
    }
    for domain in &mut grant.domains {
        *domain = domain.trim().to_string();
    }
    for subdomain in &mut grant.subdomains {
        *subdomain = subdomain.trim().to_string();
    }
}

fn verify_user_format(grant: &Grant) -> Result<(), OpCode> {
    if !validate::user(&grant.user).valid {
        return Err(OpCode::UserFormat);
    }
    Ok(())
}

fn verify_field_formats(grant: &Grant) -> Result<(), OpCode> {
    if !validate::token(&grant.token).valid {
        return Err(OpCode::TokenFormat);
    }
    if !validate::comment(&grant.comment).valid {
        return Err(OpCode::CommentFormat);
    }
    if !validate::ports(&normalize::join_ports(&grant.ports)).valid {
        return Err(OpCode::PortsFormat);
    }
    if !validate::domains(&normalize::join_list(&grant.domains)).valid {
        return Err(OpCode::DomainsFormat);
    }
    if !validate::subdomains(&normalize::join_list(&grant.subdomains)).valid {
        return Err(OpCode::SubdomainsFormat);
    }
    if !validate::expire_date(&grant.expire_date).valid {
        return Err(OpCode::ExpireDateFormat);
    }
    Ok(())
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
