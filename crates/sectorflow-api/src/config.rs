//! 서버 설정 로드.

use std::path::Path;

use sectorflow_core::{AppConfig, CoreResult};

/// 설정 파일(또는 환경변수)에서 설정을 읽고 CLI 포트를 덮어쓴 뒤 검증합니다.
pub fn resolve_config(path: Option<&Path>, port: Option<u16>) -> CoreResult<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env(),
    };
    if let Some(port) = port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorflow_core::CoreError;

    fn write_config(name: &str, body: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sectorflow-api-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let path = write_config(
            "zero.toml",
            "[scheduler]\ntrading_interval_minutes = 0\noff_hours_interval_minutes = 0\nbackoff_minutes = 0\n",
        );

        let result = resolve_config(Some(&path), None);

        assert!(matches!(result, Err(CoreError::Config(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let path = write_config("timeout.toml", "[upstream]\ntimeout_secs = 0\n");

        assert!(resolve_config(Some(&path), None).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_port_override() {
        let path = write_config("port.toml", "[server]\nport = 9000\n");

        let config = resolve_config(Some(&path), Some(5055)).unwrap();

        assert_eq!(config.server.port, 5055);
        assert_eq!(config.scheduler.trading_interval_minutes, 15);
        let _ = std::fs::remove_file(path);
    }
}
