//! Status API.
//!
//! Two read endpoints plus an operator-only cooldown reset. Plain JSON, no
//! authentication: this binds to an operator-private interface.

use crate::service::KeeperService;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use keeper_types::OrderId;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub async fn serve(service: KeeperService, port: u16) -> anyhow::Result<()> {
	let app = Router::new()
		.route("/health", get(health))
		.route("/executor/status", get(executor_status))
		.route("/executor/cooldowns/clear", post(clear_all_cooldowns))
		.route("/executor/cooldowns/{order_id}/clear", post(clear_cooldown))
		.with_state(service)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive());

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
	info!("status API listening on port {}", port);

	axum::serve(listener, app).await?;
	Ok(())
}

async fn health(State(service): State<KeeperService>) -> Json<serde_json::Value> {
	Json(serde_json::json!({
		"status": "ok",
		"service": "amm-limit-keeper",
		"executor": {
			"enabled": service.status.enabled(),
			"running": service.status.running(),
		},
		"timestamp": chrono::Utc::now().timestamp(),
	}))
}

async fn executor_status(State(service): State<KeeperService>) -> Json<serde_json::Value> {
	Json(serde_json::to_value(service.status.snapshot()).unwrap_or_default())
}

async fn clear_all_cooldowns(State(service): State<KeeperService>) -> StatusCode {
	match &service.executor {
		Some(executor) => {
			executor.clear_all_cooldowns();
			info!("all cooldowns cleared by operator");
			StatusCode::NO_CONTENT
		}
		None => StatusCode::SERVICE_UNAVAILABLE,
	}
}

async fn clear_cooldown(
	State(service): State<KeeperService>,
	Path(order_id): Path<OrderId>,
) -> StatusCode {
	match &service.executor {
		Some(executor) => {
			if executor.clear_cooldown(order_id) {
				info!(order_id, "cooldown cleared by operator");
				StatusCode::NO_CONTENT
			} else {
				StatusCode::NOT_FOUND
			}
		}
		None => StatusCode::SERVICE_UNAVAILABLE,
	}
}
