//! 플러그인 변환기 통합 테스트
//!
//! YAML 명세 -> 태그 열거형 -> Directive 트리 경로를 검증합니다.

use logweave_core::{
    Directive, DirectiveConverter, LogweaveError, NoopSecretResolver, SecretMode,
    StoreSecretResolver, ValidationError,
};
use logweave_plugins::{FilterSpec, InputSpec, OutputSpec};
use pretty_assertions::assert_eq;

/// 트리를 `directive@type[id] k=v ...` 줄 목록으로 펼칩니다.
fn outline(directive: &dyn Directive, depth: usize, lines: &mut Vec<String>) {
    let meta = directive.meta();
    let mut line = format!("{}{}", "  ".repeat(depth), meta.directive);
    if let Some(plugin_type) = &meta.plugin_type {
        line.push_str(&format!("@{plugin_type}"));
    }
    if let Some(id) = &meta.id {
        line.push_str(&format!("[{id}]"));
    }
    for (key, value) in directive.params() {
        line.push_str(&format!(" {key}={value}"));
    }
    lines.push(line);
    for section in directive.sections() {
        outline(section.as_ref(), depth + 1, lines);
    }
}

fn outline_of(directive: &dyn Directive) -> Vec<String> {
    let mut lines = Vec::new();
    outline(directive, 0, &mut lines);
    lines
}

#[test]
fn tail_input_from_yaml() {
    let spec: InputSpec = serde_yaml::from_str("type: tail\npath: input.log\n").unwrap();
    let directive = spec.to_directive(&NoopSecretResolver, "test").unwrap();
    assert_eq!(outline_of(directive.as_ref()), ["source@tail[test_tail] path=input.log"]);
}

#[test]
fn parser_filter_with_sections_from_yaml() {
    let yaml = r#"
type: parser
remove_key_name_field: true
parsers:
  - type: regexp
    expression: '^(?<time>[^ ]*) (?<message>.*)$'
    time_format: '%Y-%m-%dT%H:%M:%S%z'
  - type: json
"#;
    let spec: FilterSpec = serde_yaml::from_str(yaml).unwrap();
    let directive = spec.to_directive(&NoopSecretResolver, "flow").unwrap();
    assert_eq!(
        outline_of(directive.as_ref()),
        [
            "filter@parser[flow_parser] key_name=log remove_key_name_field=true",
            "  parse@regexp expression=^(?<time>[^ ]*) (?<message>.*)$ time_format=%Y-%m-%dT%H:%M:%S%z",
            "  parse@json",
        ]
    );
}

#[test]
fn s3_output_with_buffer_from_yaml() {
    let yaml = r#"
type: s3
s3_bucket: logging-amazon-s3
s3_region: eu-central-1
path: logs/${tag}/%Y/%m/%d/
assume_role_credentials:
  role_arn: arn:aws:iam::123456789012:role/logs
  role_session_name: logweave
buffer:
  timekey: 1m
  timekey_wait: 30s
  timekey_use_utc: true
"#;
    let spec: OutputSpec = serde_yaml::from_str(yaml).unwrap();
    let directive = spec.to_directive(&NoopSecretResolver, "test").unwrap();
    assert_eq!(
        outline_of(directive.as_ref()),
        [
            "match@s3[test_s3] path=logs/${tag}/%Y/%m/%d/ s3_bucket=logging-amazon-s3 s3_region=eu-central-1",
            "  buffer@file path=/buffers/test_s3.*.buffer retry_forever=true timekey=1m timekey_use_utc=true timekey_wait=30s",
            "  assume_role_credentials role_arn=arn:aws:iam::123456789012:role/logs role_session_name=logweave",
        ]
    );
}

#[test]
fn s3_output_without_credentials_from_yaml() {
    let spec: OutputSpec = serde_yaml::from_str("type: s3\ns3_bucket: logs\n").unwrap();
    let err = spec.to_directive(&NoopSecretResolver, "test").unwrap_err();
    match err {
        LogweaveError::Validation(ValidationError::ExclusiveGroupUnset { plugin, options }) => {
            assert_eq!(plugin, "s3");
            assert_eq!(
                options,
                [
                    "assume_role_credentials",
                    "instance_profile_credentials",
                    "shared_credentials"
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn forward_output_resolves_secret_from_yaml() {
    let yaml = r#"
type: forward
require_ack_response: true
servers:
  - host: aggregator
    port: 24224
    shared_key:
      value_from: { name: forward, key: shared-key }
"#;
    let resolver = StoreSecretResolver::new(SecretMode::Inline, "/fluentd/etc/secret")
        .with_secret("forward", "shared-key", "s3cr3t");
    let spec: OutputSpec = serde_yaml::from_str(yaml).unwrap();
    let directive = spec.to_directive(&resolver, "test").unwrap();
    assert_eq!(
        outline_of(directive.as_ref()),
        [
            "match@forward[test_forward] require_ack_response=true",
            "  server host=aggregator port=24224 shared_key=s3cr3t",
        ]
    );
}

#[test]
fn logz_output_with_buffer_from_yaml() {
    let yaml = r#"
type: logz
endpoint:
  port: 8107
  token:
    value_from: { name: logz, key: token }
  log_type: my_type
http_idle_timeout: 10
output_include_tags: true
output_include_time: true
buffer:
  chunk_limit_size: 16m
  flush_interval: 3s
  flush_thread_count: 4
  queue_limit_length: 4096
"#;
    let resolver = StoreSecretResolver::new(SecretMode::Inline, "/fluentd/etc/secret")
        .with_secret("logz", "token", "ekXLvrbriwkuTmhZrELsYbSznxqnhyQj");
    let spec: OutputSpec = serde_yaml::from_str(yaml).unwrap();
    let directive = spec.to_directive(&resolver, "test").unwrap();
    assert_eq!(
        outline_of(directive.as_ref()),
        [
            "match@logzio_buffered[test_logzio_buffered] \
             endpoint_url=https://listener.logz.io:8107?token=ekXLvrbriwkuTmhZrELsYbSznxqnhyQj&type=my_type \
             http_idle_timeout=10 output_include_tags=true output_include_time=true",
            "  buffer@file chunk_limit_size=16m flush_interval=3s flush_thread_count=4 \
             path=/buffers/test_logzio_buffered.*.buffer queue_limit_length=4096 \
             retry_forever=true timekey=10m timekey_wait=10m",
        ]
    );
}

#[test]
fn conversion_is_deterministic() {
    let yaml = r#"
type: detect_exceptions
languages: [java, python, go]
multiline_flush_interval: 0.5
max_lines: 1000
"#;
    let spec: FilterSpec = serde_yaml::from_str(yaml).unwrap();
    let first = outline_of(spec.to_directive(&NoopSecretResolver, "x").unwrap().as_ref());
    for _ in 0..10 {
        let again = outline_of(spec.to_directive(&NoopSecretResolver, "x").unwrap().as_ref());
        assert_eq!(again, first);
    }
}
