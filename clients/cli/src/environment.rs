use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the deployment modes the client can run under.
#[derive(Clone, Default, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development against services on localhost.
    #[default]
    Development,
    /// Live deployment. The only mode that forwards errors to the tracker.
    Production,
    /// Regression environment used by the QA pipelines.
    Regression,
}

impl Environment {
    /// Reads the environment from `WANDER_ENVIRONMENT`, falling back to the default.
    pub fn from_env() -> Self {
        std::env::var("WANDER_ENVIRONMENT")
            .unwrap_or_default()
            .parse::<Environment>()
            .unwrap_or_default()
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Returns the default wanderlist service URL associated with the environment.
    pub fn wanderlist_api_url(&self) -> String {
        match self {
            Environment::Development => "http://localhost:8000/api".to_string(),
            Environment::Production => "https://api.wander.travel/api".to_string(),
            Environment::Regression => "https://regression-api.wander.travel/api".to_string(),
        }
    }

    /// Returns the default packages service URL associated with the environment.
    pub fn packages_api_url(&self) -> String {
        match self {
            Environment::Development => "http://localhost:8001/api".to_string(),
            Environment::Production => "https://packages.wander.travel/api".to_string(),
            Environment::Regression => "https://regression-packages.wander.travel/api".to_string(),
        }
    }

    /// Returns the public URL the web application is served from.
    pub fn public_app_url(&self) -> String {
        match self {
            Environment::Development => "http://localhost:3000".to_string(),
            Environment::Production => "https://wander.travel".to_string(),
            Environment::Regression => "https://regression.wander.travel".to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "regression" => Ok(Environment::Regression),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "Development"),
            Environment::Production => write!(f, "Production"),
            Environment::Regression => write!(f, "Regression"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, App URL: {}", self, self.public_app_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment_names() {
        assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("Regression".parse::<Environment>(), Ok(Environment::Regression));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_only_production_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Regression.is_production());
    }
}
