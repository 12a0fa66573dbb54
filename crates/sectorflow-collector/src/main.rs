//! Standalone cache refresher CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use sectorflow_collector::{CollectorConfig, RefreshScheduler};
use sectorflow_core::{init_logging, LogConfig};
use sectorflow_data::{blob_store_from_config, CacheStore};

#[derive(Parser)]
#[command(name = "sectorflow-collector")]
#[command(about = "SectorFlow cache refresher", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (없으면 환경변수만 사용)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 갱신 1회 실행 후 캐시 파일 저장
    RunOnce,

    /// 데몬 모드: 장중 15분 / 장외 120분 주기로 갱신
    Daemon,

    /// 저장된 캐시 파일 요약 출력
    Inspect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CollectorConfig::load(path)?,
        None => CollectorConfig::from_env()?,
    };

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!("SectorFlow Collector 시작");
    tracing::debug!(
        primary = %config.upstream.primary_url,
        backup = %config.upstream.backup_url,
        cache = %config.storage.cache_path().display(),
        "설정 로드 완료"
    );

    let cache = Arc::new(CacheStore::new(blob_store_from_config(&config.storage)));

    match cli.command {
        Commands::RunOnce => {
            let scheduler = RefreshScheduler::from_config(&config, cache)?;
            let stats = scheduler.run_cycle().await?;
            stats.log_summary("단발 갱신");
        }
        Commands::Daemon => {
            let scheduler = Arc::new(RefreshScheduler::from_config(&config, cache)?);

            let token = CancellationToken::new();
            let handle = scheduler.clone().spawn(token.clone(), true);

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            token.cancel();
            handle.await?;
        }
        Commands::Inspect => match cache.load().await {
            Some(cached) => {
                for (category, period, records) in cached.snapshot.iter() {
                    let top = records.first().map(|r| r.name.as_str()).unwrap_or("-");
                    tracing::info!(
                        category = category.label(),
                        period = period.label(),
                        records = records.len(),
                        top,
                        "캐시 요약"
                    );
                }
            }
            None => {
                tracing::warn!(
                    location = %cache.blob_location(),
                    "저장된 캐시가 없습니다"
                );
            }
        },
    }

    tracing::info!("SectorFlow Collector 종료");
    Ok(())
}
