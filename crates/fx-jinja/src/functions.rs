//! Template functions: var(), env(), identify(), days_ago(), days_from_now()
//! and error().

use crate::context::INSTANT_FORMAT;
use chrono::{Duration, NaiveDateTime};
use fx_core::identify::{identify_integer, identify_uuid, IdKind};
use minijinja::value::Value;
use minijinja::{Error, ErrorKind};
use std::collections::HashMap;

/// Create the var() function that retrieves variables from config
///
/// Usage in templates:
/// ```jinja
/// {{ var('tenant') }}
/// {{ var('missing', 'default_value') }}
/// ```
pub(crate) fn make_var_fn(
    vars: HashMap<String, serde_yaml::Value>,
) -> impl Fn(&str, Option<Value>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |name: &str, default: Option<Value>| {
        if let Some(value) = vars.get(name) {
            Ok(Value::from_serialize(value))
        } else if let Some(default_val) = default {
            Ok(default_val)
        } else {
            Err(Error::new(
                ErrorKind::UndefinedError,
                format!("Variable '{}' is not defined and no default provided", name),
            ))
        }
    }
}

/// Create the `env(name, default?)` function to read environment variables.
///
/// Usage in templates:
/// ```jinja
/// {{ env("API_HOST") }}
/// {{ env("MISSING_VAR", "fallback") }}
/// ```
pub(crate) fn make_env_fn(
) -> impl Fn(&str, Option<Value>) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |name: &str, default: Option<Value>| match std::env::var(name) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(d) => Ok(d.to_string()),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!(
                    "Environment variable '{}' is not set and no default provided",
                    name
                ),
            )),
        },
    }
}

/// Create the `identify(label, kind?)` function exposing label hashing.
///
/// Usage in templates:
/// ```jinja
/// author_id: {{ identify("alice") }}
/// account_uuid: {{ identify("acme", "uuid") }}
/// ```
pub(crate) fn make_identify_fn(
) -> impl Fn(&str, Option<String>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    |label: &str, kind: Option<String>| {
        let kind: IdKind = kind
            .as_deref()
            .unwrap_or("integer")
            .parse()
            .map_err(|e: String| Error::new(ErrorKind::InvalidOperation, e))?;
        Ok(match kind {
            IdKind::Integer => Value::from(identify_integer(label)),
            IdKind::Uuid => Value::from(identify_uuid(label).to_string()),
        })
    }
}

/// Create a function returning the run instant shifted by `n` days.
///
/// Registered twice: `days_ago(n)` with `sign = -1` and `days_from_now(n)`
/// with `sign = 1`.
pub(crate) fn make_day_offset_fn(
    loaded_at: NaiveDateTime,
    sign: i64,
) -> impl Fn(i64) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |days: i64| {
        let offset = days
            .checked_mul(sign)
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("day offset {} is out of range", days),
                )
            })?;
        let instant = loaded_at.checked_add_signed(offset).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("day offset {} is out of range", days),
            )
        })?;
        Ok(instant.format(INSTANT_FORMAT).to_string())
    }
}

/// Create the `error(msg)` function that aborts rendering.
///
/// Usage in templates:
/// ```jinja
/// {% if var("tenant", none) is none %}{{ error("tenant is required") }}{% endif %}
/// ```
pub(crate) fn make_error_fn(
) -> impl Fn(&str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |msg: &str| Err(Error::new(ErrorKind::InvalidOperation, msg.to_string()))
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
