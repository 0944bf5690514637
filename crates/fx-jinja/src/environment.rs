//! Jinja environment used to expand fixture files

use crate::context::FileContext;
use crate::error::{JinjaError, JinjaResult};
use crate::functions::{
    make_day_offset_fn, make_env_fn, make_error_fn, make_identify_fn, make_var_fn,
};
use chrono::NaiveDateTime;
use minijinja::Environment;
use std::collections::HashMap;

/// Jinja templating environment for fixture files.
///
/// One environment is built per compilation run; every file is rendered with
/// its own [`FileContext`], so templates cannot leak state into each other.
pub struct JinjaEnvironment<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaEnvironment<'a> {
    /// Create an environment with project variables and the run instant
    pub fn new(vars: &HashMap<String, serde_yaml::Value>, loaded_at: NaiveDateTime) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.add_function("var", make_var_fn(vars.clone()));
        env.add_function("env", make_env_fn());
        env.add_function("identify", make_identify_fn());
        env.add_function("days_ago", make_day_offset_fn(loaded_at, -1));
        env.add_function("days_from_now", make_day_offset_fn(loaded_at, 1));
        env.add_function("error", make_error_fn());

        Self { env }
    }

    /// Render the content of one fixture file
    pub fn render(&self, template: &str, file: &FileContext) -> JinjaResult<String> {
        log::debug!("Rendering fixture template {}", file.fixture_path);
        self.env
            .render_str(template, file)
            .map_err(|e| JinjaError::RenderError {
                path: file.fixture_path.clone(),
                message: render_error_message(&e),
            })
    }
}

/// Flatten a minijinja error and its causes into one line
fn render_error_message(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
