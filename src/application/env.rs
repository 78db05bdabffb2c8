//! Per-call resolution of the build-time flag and API credentials.
//!
//! Nothing here is cached: every accessor call reads the environment again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::config::EnvironmentSettings;
use crate::domain::resources::Audience;

pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the live process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No network path to the CMS; serve from snapshots.
    BuildTime,
    Runtime,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::BuildTime => "build_time",
            Mode::Runtime => "runtime",
        }
    }
}

#[derive(Clone)]
pub struct RuntimeEnv {
    source: Arc<dyn EnvSource>,
    names: EnvironmentSettings,
}

impl RuntimeEnv {
    pub fn new(source: Arc<dyn EnvSource>, names: EnvironmentSettings) -> Self {
        Self { source, names }
    }

    pub fn process(names: EnvironmentSettings) -> Self {
        Self::new(Arc::new(ProcessEnv), names)
    }

    pub fn mode(&self) -> Mode {
        match self.source.var(&self.names.build_time_var) {
            Some(value) if is_truthy(&value) => Mode::BuildTime,
            _ => Mode::Runtime,
        }
    }

    /// Token for `audience`; `None` means the request goes out unauthenticated.
    pub fn credential(&self, audience: Audience) -> Option<String> {
        let name = match audience {
            Audience::Frontend => &self.names.frontend_token_var,
            Audience::Backend => &self.names.backend_token_var,
        };
        let token = self.source.var(name)?;
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            warn!(
                audience = audience.as_str(),
                variable = %name,
                "ignoring api token with non-printable characters"
            );
            return None;
        }
        Some(token.to_string())
    }
}

impl fmt::Debug for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeEnv")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> RuntimeEnv {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RuntimeEnv::new(Arc::new(vars), EnvironmentSettings::default())
    }

    #[test]
    fn mode_defaults_to_runtime() {
        assert_eq!(env(&[]).mode(), Mode::Runtime);
        assert_eq!(env(&[("FOLIO_BUILD_TIME", "false")]).mode(), Mode::Runtime);
        assert_eq!(env(&[("FOLIO_BUILD_TIME", "")]).mode(), Mode::Runtime);
    }

    #[test]
    fn truthy_values_select_build_time() {
        for value in ["1", "true", "TRUE", " yes ", "On"] {
            assert_eq!(
                env(&[("FOLIO_BUILD_TIME", value)]).mode(),
                Mode::BuildTime,
                "{value:?}"
            );
        }
    }

    #[test]
    fn credentials_are_resolved_per_audience() {
        let env = env(&[
            ("FOLIO_FRONTEND_API_TOKEN", "front"),
            ("FOLIO_BACKEND_API_TOKEN", " back \n"),
        ]);
        assert_eq!(env.credential(Audience::Frontend).as_deref(), Some("front"));
        assert_eq!(env.credential(Audience::Backend).as_deref(), Some("back"));
    }

    #[test]
    fn blank_or_unsafe_tokens_mean_unauthenticated() {
        let env = env(&[
            ("FOLIO_FRONTEND_API_TOKEN", "   "),
            ("FOLIO_BACKEND_API_TOKEN", "bad token"),
        ]);
        assert_eq!(env.credential(Audience::Frontend), None);
        assert_eq!(env.credential(Audience::Backend), None);
    }

    #[test]
    fn configured_variable_names_are_honoured() {
        let names = EnvironmentSettings {
            build_time_var: "IS_BUILD".into(),
            ..EnvironmentSettings::default()
        };
        let vars: HashMap<String, String> =
            [("IS_BUILD".to_string(), "1".to_string())].into_iter().collect();
        let env = RuntimeEnv::new(Arc::new(vars), names);
        assert_eq!(env.mode(), Mode::BuildTime);
    }
}
