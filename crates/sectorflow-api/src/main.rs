//! 섹터 자금 흐름 API 서버.
//!
//! 캐시를 복원(또는 최초 갱신)한 뒤 백그라운드 스케줄러를 띄우고
//! Axum REST API를 서비스합니다.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use sectorflow_api::{create_api_router, resolve_config, AppState};
use sectorflow_collector::RefreshScheduler;
use sectorflow_core::{init_logging, LogConfig};
use sectorflow_data::{blob_store_from_config, CacheStore, FallbackChain};

#[derive(Parser)]
#[command(name = "sectorflow-api")]
#[command(about = "SectorFlow REST API server", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (없으면 환경변수만 사용)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 바인딩 포트 (설정값보다 우선)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.port)?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting SectorFlow API Server v{}", env!("CARGO_PKG_VERSION"));

    let cache = Arc::new(CacheStore::new(blob_store_from_config(&config.storage)));
    let chain = FallbackChain::from_config(&config.upstream)?;
    info!(
        primary = %config.upstream.primary_url,
        backup = %config.upstream.backup_url,
        cache = %cache.blob_location(),
        "데이터 소스 구성 완료"
    );

    let scheduler = Arc::new(RefreshScheduler::new(
        chain.clone(),
        cache.clone(),
        config.scheduler.clone(),
    ));

    // 파일 복원 또는 최초 갱신. 실패해도 서버는 캐시 미스 경로로 응답합니다.
    let immediate = match scheduler.bootstrap().await {
        Ok(outcome) => !outcome.refreshed(),
        Err(e) => {
            error!(error = %e, "초기 캐시 준비 실패");
            true
        }
    };

    let shutdown_token = CancellationToken::new();
    let scheduler_handle = scheduler.clone().spawn(shutdown_token.clone(), immediate);
    info!("Background refresh scheduler started");

    let state = Arc::new(AppState::new(cache, chain));

    let app = create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await?;

    if let Err(e) = scheduler_handle.await {
        warn!(error = %e, "스케줄러 태스크 종료 실패");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만 허용하고, 없으면 모두 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .expose_headers([axum::http::header::CONTENT_DISPOSITION])
}

/// 종료 시그널 대기 후 백그라운드 태스크에 전파.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
