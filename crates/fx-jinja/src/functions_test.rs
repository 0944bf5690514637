use super::*;
use chrono::NaiveDate;
use serial_test::serial;

fn run_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
}

#[test]
fn test_var_fn_found_and_default() {
    let mut vars = HashMap::new();
    vars.insert(
        "tenant".to_string(),
        serde_yaml::Value::String("acme".to_string()),
    );
    let var = make_var_fn(vars);

    assert_eq!(var("tenant", None).unwrap().as_str(), Some("acme"));
    assert_eq!(
        var("missing", Some(Value::from("fallback")))
            .unwrap()
            .as_str(),
        Some("fallback")
    );
    assert!(var("missing", None).is_err());
}

#[test]
#[serial]
fn test_env_fn() {
    let env = make_env_fn();
    std::env::set_var("FX_JINJA_TEST_VAR", "present");
    assert_eq!(env("FX_JINJA_TEST_VAR", None).unwrap(), "present");
    std::env::remove_var("FX_JINJA_TEST_VAR");
    assert_eq!(
        env("FX_JINJA_TEST_VAR", Some(Value::from("fallback"))).unwrap(),
        "fallback"
    );
    assert!(env("FX_JINJA_TEST_VAR", None).is_err());
}

#[test]
fn test_identify_fn() {
    let identify = make_identify_fn();
    assert_eq!(
        identify("alice", None).unwrap(),
        Value::from(663665735_i64)
    );
    assert_eq!(
        identify("alice", Some("uuid".to_string()))
            .unwrap()
            .as_str(),
        Some("f7d8be13-2a72-5104-bd02-7a5964737a91")
    );
    assert!(identify("alice", Some("float".to_string())).is_err());
}

#[test]
fn test_day_offset_fns() {
    let days_ago = make_day_offset_fn(run_start(), -1);
    let days_from_now = make_day_offset_fn(run_start(), 1);
    assert_eq!(days_ago(3).unwrap(), "2024-03-07 12:30:00");
    assert_eq!(days_from_now(1).unwrap(), "2024-03-11 12:30:00");
    assert_eq!(days_ago(0).unwrap(), "2024-03-10 12:30:00");
}

#[test]
fn test_error_fn() {
    let error = make_error_fn();
    let err = error("boom").unwrap_err();
    assert!(err.to_string().contains("boom"));
}
