//! 설정 관리 — logweave.toml 파싱 및 런타임 설정
//!
//! [`LogweaveConfig`]는 컴파일러 실행에 필요한 설정을 담는 최상위 구조체입니다.
//! 설정 값은 생성자를 통해 명시적으로 전달되며, 프로세스 전역 상태는 없습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWEAVE_COMPILER_INDENT=4` 형식)
//! 3. 설정 파일 (`logweave.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logweave_core::error::LogweaveError> {
//! use logweave_core::config::LogweaveConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogweaveConfig::load("logweave.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogweaveConfig::parse("[compiler]\nindent = 4")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogweaveError};
use crate::secret::SecretMode;

/// 들여쓰기 폭 상한
const MAX_INDENT: usize = 16;

/// logweave 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogweaveConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 컴파일러 설정
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// 시크릿 해석 설정
    #[serde(default)]
    pub secret: SecretConfig,
}

impl LogweaveConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogweaveError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogweaveError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogweaveError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogweaveError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogweaveError> {
        toml::from_str(toml_str).map_err(|e| {
            LogweaveError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 현재 설정을 TOML 문자열로 직렬화합니다.
    pub fn to_toml(&self) -> Result<String, LogweaveError> {
        toml::to_string_pretty(self).map_err(|e| {
            LogweaveError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWEAVE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWEAVE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWEAVE_GENERAL_LOG_FORMAT");

        // Compiler
        override_string(&mut self.compiler.router_id, "LOGWEAVE_COMPILER_ROUTER_ID");
        override_usize(&mut self.compiler.indent, "LOGWEAVE_COMPILER_INDENT");
        override_string(&mut self.compiler.format, "LOGWEAVE_COMPILER_FORMAT");

        // Secret
        override_secret_mode(&mut self.secret.mode, "LOGWEAVE_SECRET_MODE");
        override_string(&mut self.secret.mount_path, "LOGWEAVE_SECRET_MOUNT_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogweaveError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_log_formats.join(", ")),
            }
            .into());
        }

        if self.compiler.router_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compiler.router_id".to_owned(),
                reason: "router id must not be empty".to_owned(),
            }
            .into());
        }

        if self.compiler.router_id.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "compiler.router_id".to_owned(),
                reason: "router id must not contain whitespace".to_owned(),
            }
            .into());
        }

        if self.compiler.indent > MAX_INDENT {
            return Err(ConfigError::InvalidValue {
                field: "compiler.indent".to_owned(),
                reason: format!("must be 0-{MAX_INDENT}"),
            }
            .into());
        }

        let valid_formats = ["fluent", "json"];
        if !valid_formats.contains(&self.compiler.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "compiler.format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !self.secret.mount_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "secret.mount_path".to_owned(),
                reason: format!(
                    "mount path '{}' must be an absolute path",
                    self.secret.mount_path
                ),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 컴파일러 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// 라우터 `@id` 접두어 (`{router_id}_label_router`)
    pub router_id: String,
    /// 렌더링 들여쓰기 폭
    pub indent: usize,
    /// 출력 형식 (fluent, json)
    pub format: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            router_id: "logweave".to_owned(),
            indent: 2,
            format: "fluent".to_owned(),
        }
    }
}

/// 시크릿 해석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// 저장소 참조 해석 방식 (inline, mount)
    pub mode: SecretMode,
    /// 마운트된 시크릿 파일의 루트 경로
    pub mount_path: String,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            mode: SecretMode::Mount,
            mount_path: "/fluentd/etc/secret".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_secret_mode(target: &mut SecretMode, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<SecretMode>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse secret mode from env var, ignoring"
            ),
        }
    }
}
