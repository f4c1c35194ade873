use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Deployment environment a recommendation run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "TEST",
            Environment::Production => "PRODUCTION",
        }
    }

    /// Qualify an application namespace with this environment, e.g. `sa-test`.
    pub fn qualify(&self, app_namespace: &str) -> String {
        format!("{}-{}", app_namespace, self.as_str().to_lowercase())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TEST" => Ok(Environment::Test),
            "PRODUCTION" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {s}")),
        }
    }
}
