//! 메트릭 상수 및 설명 등록
//!
//! 컴파일러 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 라이브러리는 `metrics::counter!()`로 값을 기록만 하며,
//! 레코더/익스포터 설치는 호출자 책임입니다.
//!
//! 컴파일러를 내장하는 장기 실행 프로세스(예: 조정 루프)가 레코더를 설치한 뒤
//! [`describe_all`]을 호출합니다. 일회성 실행인 `logweave` CLI는 레코더를 설치하지
//! 않으므로 CLI에서 기록되는 카운터는 모두 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logweave_compiler_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 렌더러 레이블 키 (fluent, json)
pub const LABEL_FORMAT: &str = "format";

// ─── 컴파일러 메트릭 ────────────────────────────────────────────────

/// 등록된 Flow 수 (counter)
pub const COMPILER_FLOWS_REGISTERED_TOTAL: &str = "logweave_compiler_flows_registered_total";

/// 거부된 Flow 수 (counter)
pub const COMPILER_FLOWS_REJECTED_TOTAL: &str = "logweave_compiler_flows_rejected_total";

/// 빌드 시도 수 (counter, label: result)
pub const COMPILER_BUILDS_TOTAL: &str = "logweave_compiler_builds_total";

/// 렌더링된 문서 수 (counter, label: format)
pub const COMPILER_RENDERS_TOTAL: &str = "logweave_compiler_renders_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 내장 프로세스가 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        COMPILER_FLOWS_REGISTERED_TOTAL,
        "Total number of flows accepted by the builder"
    );
    describe_counter!(
        COMPILER_FLOWS_REJECTED_TOTAL,
        "Total number of flows rejected by validation or label collision"
    );
    describe_counter!(
        COMPILER_BUILDS_TOTAL,
        "Total number of build attempts by result"
    );
    describe_counter!(
        COMPILER_RENDERS_TOTAL,
        "Total number of rendered documents by output format"
    );
}
