//! 에러 타입 — 컴파일 단계별 에러 정의
//!
//! [`LogweaveError`]는 컴파일 파이프라인 전체의 최상위 에러입니다.
//! 각 단계의 에러는 `#[from]` 변환으로 `?` 연산자를 통해 자연스럽게 전파됩니다.
//! 빌드는 첫 번째 에러에서 즉시 중단되며 부분 결과물을 만들지 않습니다.

/// logweave 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogweaveError {
    /// 플러그인 명세의 구조적 불변식 위반
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 문자열 표현이 없는 필드 값
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// 시크릿 참조 해석 실패
    #[error("secret resolution error: {0}")]
    Secret(#[from] SecretError),

    /// 서로 다른 Flow가 같은 라벨을 도출함
    #[error("duplicate label error: {0}")]
    DuplicateLabel(#[from] DuplicateLabelError),

    /// 출력 싱크 기록 실패
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// 설정/매니페스트 로딩 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 구조적 불변식 위반
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// 상호 배타 옵션 그룹 중 아무것도 설정되지 않음
    #[error("{plugin}: one of {} must be configured", .options.join(" or "))]
    ExclusiveGroupUnset {
        /// 플러그인 타입 이름
        plugin: String,
        /// 선택 가능한 옵션 목록
        options: Vec<String>,
    },

    /// 상호 배타 옵션 그룹이 둘 이상 설정됨
    #[error("{plugin}: only one of {} can be configured", .options.join(" or "))]
    ExclusiveGroupConflict {
        /// 플러그인 타입 이름
        plugin: String,
        /// 동시에 설정된 옵션 목록
        options: Vec<String>,
    },

    /// 필수 필드 누락
    #[error("{plugin}: required field '{field}' is missing")]
    MissingField {
        /// 플러그인 타입 이름
        plugin: String,
        /// 누락된 필드명
        field: String,
    },

    /// 잘못된 Flow / Selector 구성
    #[error("invalid flow: {reason}")]
    InvalidFlow {
        /// 실패 사유
        reason: String,
    },
}

/// 필드 값을 문자열로 표현할 수 없음
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}': {reason}")]
pub struct ConversionError {
    /// 필드명
    pub field: String,
    /// 실패 사유
    pub reason: String,
}

/// 시크릿 해석 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    /// 참조한 시크릿이 저장소에 없음
    #[error("secret '{name}' has no key '{key}'")]
    NotFound {
        /// 시크릿 이름
        name: String,
        /// 시크릿 키
        key: String,
    },

    /// 시크릿 참조 형식 오류
    #[error("malformed secret reference: {reason}")]
    Malformed {
        /// 실패 사유
        reason: String,
    },
}

/// 서로 다른 Flow가 같은 라우팅 라벨을 도출함
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("label {label} already registered by {existing}, rejected {incoming}")]
pub struct DuplicateLabelError {
    /// 충돌한 라벨
    pub label: String,
    /// 먼저 등록된 Flow 설명
    pub existing: String,
    /// 거부된 Flow 설명
    pub incoming: String,
}

/// 렌더링 에러
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// 출력 싱크 기록 실패
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    /// 구조화 출력 직렬화 실패
    #[error("failed to serialize directive tree: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 출력이 UTF-8이 아님
    #[error("rendered output is not valid utf-8")]
    InvalidUtf8,
}

/// 설정 관련 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
