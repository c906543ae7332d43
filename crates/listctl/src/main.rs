// # listctl - List API command-line front end
//
// Thin integration layer over listapi-core. It turns one command line into
// one API request, runs it through the dispatcher, and prints the response.
// All routing, validation, and table logic lives in listapi-core.
//
// ## Usage
//
// ```text
// listctl <METHOD> <PATH> [BODY]
// ```
//
// BODY is a JSON document. Pass `-` to read it from stdin.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Store
// - `LISTAPI_STORE_TYPE`: Type of store (file, memory)
// - `LISTAPI_STORE_PATH`: Path to store file (for file store)
//
// ### Authorization
// - `LISTAPI_API_TOKEN`: Token callers must present (unset: everyone is authorized)
// - `LISTAPI_CLIENT_TOKEN`: Token this invocation presents
//
// ### Logging
// - `LISTAPI_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export LISTAPI_STORE_TYPE=file
// export LISTAPI_STORE_PATH=/var/lib/listapi/lists.json
//
// listctl POST /api/groups/office '{"enabled": true, "description": "Office"}'
// listctl POST /api/domains/deny/exact/ads.example '{"enabled": true, "groups": [1]}'
// listctl GET /api/domains/deny
// listctl DELETE /api/domains/deny/exact/ads.example
// ```
//
// ## Exit codes
//
// - 0: The request succeeded
// - 1: Configuration or usage error
// - 2: Runtime error (store could not be opened, I/O failure)
// - 3: The API answered with an error status

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use listapi_core::{
    ApiRequest, AuthConfig, Dispatcher, ListApiConfig, Method, StoreConfig, store,
};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum ListctlExitCode {
    /// Request succeeded
    CleanShutdown = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// The API rejected the request
    RequestRejected = 3,
}

impl From<ListctlExitCode> for ExitCode {
    fn from(code: ListctlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    store_type: String,
    store_path: Option<String>,
    api_token: Option<String>,
    client_token: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            store_type: env::var("LISTAPI_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()),
            store_path: env::var("LISTAPI_STORE_PATH").ok(),
            api_token: env::var("LISTAPI_API_TOKEN").ok(),
            client_token: env::var("LISTAPI_CLIENT_TOKEN").ok(),
            log_level: env::var("LISTAPI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "LISTAPI_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" && self.store_path.as_ref().is_none_or(|p| p.is_empty()) {
            anyhow::bail!(
                "LISTAPI_STORE_PATH is required when LISTAPI_STORE_TYPE=file. \
                Set it via: export LISTAPI_STORE_PATH=/var/lib/listapi/lists.json"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LISTAPI_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.api_config().validate()?;
        Ok(())
    }

    /// Library configuration derived from the environment
    fn api_config(&self) -> ListApiConfig {
        let store = match self.store_type.as_str() {
            "file" => StoreConfig::File {
                path: self.store_path.clone().unwrap_or_default(),
            },
            _ => StoreConfig::Memory,
        };
        ListApiConfig {
            store,
            auth: AuthConfig {
                api_token: self.api_token.clone(),
            },
        }
    }
}

/// One request taken from the command line
struct Invocation {
    method: Method,
    path: String,
    body: Option<String>,
}

impl Invocation {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let method = args
            .next()
            .context("missing METHOD. Usage: listctl <METHOD> <PATH> [BODY]")?;
        let method: Method = method.parse()?;
        let path = args
            .next()
            .context("missing PATH. Usage: listctl <METHOD> <PATH> [BODY]")?;
        let body = match args.next() {
            Some(body) if body == "-" => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read body from stdin")?;
                Some(buf)
            }
            other => other,
        };
        if args.next().is_some() {
            anyhow::bail!("too many arguments. Usage: listctl <METHOD> <PATH> [BODY]");
        }

        Ok(Self { method, path, body })
    }

    fn into_request(self, token: Option<String>) -> ApiRequest {
        let mut request = ApiRequest::new(self.method, self.path);
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        if let Some(token) = token {
            request = request.with_token(token);
        }
        request
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ListctlExitCode::ConfigError.into();
    }

    let invocation = match Invocation::from_args(env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Usage error: {}", e);
            return ListctlExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries the response
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ListctlExitCode::ConfigError.into();
    }

    let api_config = config.api_config();
    info!("Using {} store", api_config.store.type_name());

    let store = match store::open(&api_config.store) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open store: {}", e);
            return ListctlExitCode::RuntimeError.into();
        }
    };

    let dispatcher = Dispatcher::new(store, api_config.client_auth());
    let request = invocation.into_request(config.client_token.clone());
    debug!("Dispatching {} {}", request.method, request.path);

    let response = dispatcher.handle(&request);

    println!("{}", response.status);
    if let Some(body) = &response.body {
        match serde_json::to_string_pretty(body) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to render response body: {}", e);
                return ListctlExitCode::RuntimeError.into();
            }
        }
    }

    if response.is_success() {
        ListctlExitCode::CleanShutdown.into()
    } else {
        ListctlExitCode::RequestRejected.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_invocation_parses_method_path_and_body() {
        let invocation =
            Invocation::from_args(args(&["post", "/api/groups/office", r#"{"enabled":true}"#]))
                .unwrap();
        assert_eq!(invocation.method, Method::Post);
        assert_eq!(invocation.path, "/api/groups/office");
        assert_eq!(invocation.body.as_deref(), Some(r#"{"enabled":true}"#));

        let request = invocation.into_request(Some("t".to_string()));
        assert_eq!(request.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_invocation_rejects_bad_arguments() {
        assert!(Invocation::from_args(args(&[])).is_err());
        assert!(Invocation::from_args(args(&["GET"])).is_err());
        assert!(Invocation::from_args(args(&["FETCH", "/api/groups"])).is_err());
        assert!(Invocation::from_args(args(&["GET", "/a", "{}", "extra"])).is_err());
    }

    #[test]
    fn test_config_requires_path_for_file_store() {
        let config = Config {
            store_type: "file".to_string(),
            store_path: None,
            api_token: None,
            client_token: None,
            log_level: "info".to_string(),
        };
        assert!(config.validate().is_err());

        let config = Config {
            store_path: Some("/tmp/lists.json".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.api_config().store,
            StoreConfig::File {
                path: "/tmp/lists.json".to_string()
            }
        );
    }

    #[test]
    fn test_config_rejects_unknown_store_and_level() {
        let base = Config {
            store_type: "sqlite".to_string(),
            store_path: None,
            api_token: None,
            client_token: None,
            log_level: "info".to_string(),
        };
        assert!(base.validate().is_err());

        let config = Config {
            store_type: "memory".to_string(),
            log_level: "loud".to_string(),
            ..base
        };
        assert!(config.validate().is_err());
    }
}
