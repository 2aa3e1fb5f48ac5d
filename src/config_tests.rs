use crate::config::{SchedulerConfig, parse_failure_cap};

#[test]
fn test_default_has_no_failure_cap() {
    let config = SchedulerConfig::default();
    assert_eq!(config.max_consecutive_failures, None);
}

#[test]
fn test_failure_cap_parses_positive_values() {
    assert_eq!(parse_failure_cap(Some("5")).unwrap(), Some(5));
    assert_eq!(parse_failure_cap(Some(" 12 ")).unwrap(), Some(12));
}

#[test]
fn test_failure_cap_zero_means_unlimited() {
    assert_eq!(parse_failure_cap(Some("0")).unwrap(), None);
    assert_eq!(parse_failure_cap(None).unwrap(), None);
}

#[test]
fn test_failure_cap_rejects_garbage() {
    let err = parse_failure_cap(Some("many")).unwrap_err();
    assert!(err.to_string().contains("AGENT_MAX_CONSECUTIVE_FAILURES"));
}
