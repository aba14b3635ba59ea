// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use outflo_core::OutfloError;
use outflo_core::types::{
    AgentCallLog, AgentStatus, AiAgent, Campaign, CampaignLog, CampaignStatus, Channel, Lead,
    MessageContent, ScheduleStatus,
};
use outflo_dispatch::DispatchReport;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An [`OutfloError`] mapped onto an HTTP status.
pub struct ApiError(pub OutfloError);

impl From<OutfloError> for ApiError {
    fn from(e: OutfloError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OutfloError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OutfloError::Precondition(_) => StatusCode::CONFLICT,
            OutfloError::Conflict(_) => StatusCode::CONFLICT,
            OutfloError::AdapterNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                error!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /health
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Request body for POST /v1/leads/import.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub owner_id: String,
    /// Raw CSV text, first line is the header row.
    pub csv: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Response body for POST /v1/leads/import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
}

/// POST /v1/leads/import
pub async fn post_leads_import(
    State(state): State<GatewayState>,
    Json(body): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let outcome = outflo_ingest::import(
        state.storage.as_ref(),
        &body.owner_id,
        &body.csv,
        body.source.as_deref(),
        state.ingest_batch_size,
    )
    .await?;
    Ok(Json(ImportResponse {
        inserted: outcome.inserted,
        duplicates: outcome.duplicates,
        failed: outcome.failed,
        first_error: outcome.first_error,
    }))
}

/// Query for owner-scoped list endpoints.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: String,
}

/// GET /v1/leads?owner_id=
pub async fn get_leads(
    State(state): State<GatewayState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.storage.list_leads(&query.owner_id).await?))
}

/// Request body for POST /v1/campaigns.
#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub channel: Channel,
    #[serde(default)]
    pub content_ref: Option<String>,
}

/// POST /v1/campaigns
pub async fn post_campaigns(
    State(state): State<GatewayState>,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(OutfloError::Validation("campaign title is required".to_string()).into());
    }
    let campaign = Campaign {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: body.owner_id,
        title: body.title,
        description: body.description,
        channel: body.channel,
        content_ref: body.content_ref,
        status: CampaignStatus::Draft,
        schedule_status: ScheduleStatus::Draft,
        scheduled_at: None,
        started_at: None,
        created_at: Utc::now(),
    };
    state.storage.create_campaign(&campaign).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /v1/campaigns/{id}
pub async fn get_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    match state.storage.get_campaign(&id).await? {
        Some(campaign) => Ok(Json(campaign)),
        None => Err(OutfloError::Validation(format!("campaign {id} not found")).into()),
    }
}

/// Request body for PUT /v1/campaigns/{id}/recipients.
#[derive(Debug, Deserialize)]
pub struct RecipientsRequest {
    pub lead_ids: Vec<String>,
}

/// PUT /v1/campaigns/{id}/recipients
pub async fn put_campaign_recipients(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<RecipientsRequest>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.replace_recipients(&id, &body.lead_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for POST /v1/campaigns/{id}/schedule.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub when: DateTime<Utc>,
}

/// POST /v1/campaigns/{id}/schedule
pub async fn post_campaign_schedule(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.schedule(&id, body.when).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for POST /v1/campaigns/{id}/dispatch.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub content: MessageContent,
}

/// POST /v1/campaigns/{id}/dispatch
pub async fn post_campaign_dispatch(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<DispatchRequest>,
) -> Result<Json<DispatchReport>, ApiError> {
    let report = state.orchestrator.dispatch(&id, &body.content).await?;
    Ok(Json(report))
}

/// Request body for POST /v1/agents.
#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub owner_id: String,
    pub name: String,
    pub business_type: String,
    #[serde(default)]
    pub voice_style: Option<String>,
    #[serde(default)]
    pub lead_list: Vec<String>,
}

/// POST /v1/agents
pub async fn post_agents(
    State(state): State<GatewayState>,
    Json(body): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<AiAgent>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(OutfloError::Validation("agent name is required".to_string()).into());
    }
    let agent = AiAgent {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: body.owner_id,
        name: body.name,
        status: AgentStatus::Pending,
        business_type: body.business_type,
        voice_style: body.voice_style.unwrap_or_else(|| "neutral".to_string()),
        lead_list: body.lead_list,
        current_index: 0,
        created_at: Utc::now(),
    };
    state.storage.create_agent(&agent).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /v1/agents?owner_id=
pub async fn get_agents(
    State(state): State<GatewayState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<AiAgent>>, ApiError> {
    Ok(Json(state.storage.list_agents(&query.owner_id).await?))
}

/// Agent detail with progress counts.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    #[serde(flatten)]
    pub agent: AiAgent,
    pub current_index: usize,
    pub total_leads: usize,
}

/// GET /v1/agents/{id}
pub async fn get_agent(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    match state.storage.get_agent(&id).await? {
        Some(agent) => {
            let (current_index, total_leads) =
                outflo_agent::AgentController::progress(&agent);
            Ok(Json(AgentResponse {
                agent,
                current_index,
                total_leads,
            }))
        }
        None => Err(OutfloError::Validation(format!("agent {id} not found")).into()),
    }
}

/// POST /v1/agents/{id}/start
///
/// Starts the agent and spawns its call runner.
pub async fn post_agent_start(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.controller.start(&id).await?;
    let runner = state.runner.clone();
    let token = state.shutdown.child_token();
    tokio::spawn(async move {
        if let Err(e) = runner.run(&id, token).await {
            error!(agent_id = %id, error = %e, "call runner failed");
        }
    });
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/agents/{id}/pause
pub async fn post_agent_pause(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.controller.pause(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/agents/{id}/resume
///
/// Resumes the agent and spawns a fresh call runner: the previous runner
/// exited when it observed the paused status.
pub async fn post_agent_resume(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.controller.resume(&id).await?;
    let runner = state.runner.clone();
    let token = state.shutdown.child_token();
    tokio::spawn(async move {
        if let Err(e) = runner.run(&id, token).await {
            error!(agent_id = %id, error = %e, "call runner failed");
        }
    });
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/agents/{id}/reset
pub async fn post_agent_reset(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.controller.reset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/agents/{id}
pub async fn delete_agent(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.controller.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query for GET /v1/logs/campaigns.
#[derive(Debug, Deserialize)]
pub struct CampaignLogQuery {
    #[serde(default)]
    pub campaign_id: Option<String>,
}

/// GET /v1/logs/campaigns
pub async fn get_campaign_logs(
    State(state): State<GatewayState>,
    Query(query): Query<CampaignLogQuery>,
) -> Result<Json<Vec<CampaignLog>>, ApiError> {
    Ok(Json(
        state
            .storage
            .list_campaign_logs(query.campaign_id.as_deref())
            .await?,
    ))
}

/// GET /v1/agents/{id}/logs
pub async fn get_agent_logs(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AgentCallLog>>, ApiError> {
    Ok(Json(state.storage.list_call_logs(&id).await?))
}
