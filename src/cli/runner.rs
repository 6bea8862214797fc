//! CLI runner - executes commands

use crate::auth::{Auth, UserAuth};
use crate::cli::commands::{Cli, Commands, OutputFormat, TokenTarget};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::query::UsergridQuery;
use crate::response::Response;
use crate::types::{JsonValue, Method};
use serde_json::json;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = Client::new(self.load_config()?)?;

        match &self.cli.command {
            Commands::Token { target } => self.token(&client, target).await,
            Commands::Request {
                method,
                path,
                params,
                headers,
                data,
                ql,
                limit,
                app_auth,
            } => {
                let args = RequestArgs {
                    method: *method,
                    path,
                    params,
                    headers,
                    data: data.as_deref(),
                    ql: ql.as_deref(),
                    limit: *limit,
                    app_auth: *app_auth,
                };
                self.request(&client, args).await
            }
        }
    }

    /// Load the config file if given, then apply environment overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new("", ""),
        };
        config.apply_env();
        config.validate()?;
        debug!(
            base_url = %config.base_url,
            org_id = %config.org_id,
            app_id = %config.app_id,
            "Loaded client config"
        );
        Ok(config)
    }

    async fn token(&self, client: &Client, target: &TokenTarget) -> Result<()> {
        let (auth, response) = match target {
            TokenTarget::App => {
                let response = client.authenticate_app().await;
                (client.context().app_auth().map(Auth::App), response)
            }
            TokenTarget::User {
                username,
                password,
                admin,
            } => {
                let user_auth = if *admin {
                    UserAuth::admin(username, password)
                } else {
                    UserAuth::new(username, password)
                };
                let response = client.authenticate_user(user_auth, true).await;
                let auth = client
                    .current_user()
                    .and_then(|user| user.user_auth().cloned())
                    .map(Auth::User);
                (auth, response)
            }
        };

        let auth = match auth {
            Some(auth) if response.ok() && auth.is_valid_token() => auth,
            _ => {
                self.output(&response.to_json());
                return Err(failure(&response));
            }
        };

        self.output(&json!({
            "kind": auth.kind(),
            "access_token": auth.access_token(),
            "expires_at": auth.expires_at_epoch_millis(),
            "user": response.user().and_then(|u| u.uuid_or_username()),
        }));
        Ok(())
    }

    async fn request(&self, client: &Client, args: RequestArgs<'_>) -> Result<()> {
        if args.app_auth {
            let response = client.authenticate_app().await;
            if !response.ok() {
                return Err(failure(&response));
            }
            if let Some(app_auth) = client.context().app_auth() {
                client.using_auth(app_auth);
            }
        }

        let mut builder = client.request(args.method).paths(args.path.iter().cloned());

        if args.ql.is_some() || args.limit.is_some() {
            let mut query = UsergridQuery::new();
            if let Some(ql) = args.ql {
                query = query.ql(ql);
            }
            if let Some(limit) = args.limit {
                query = query.limit(limit);
            }
            builder = builder.query(query);
        }
        for param in args.params {
            let (key, value) = parse_key_value(param)?;
            builder = builder.parameter(key, value);
        }
        for header in args.headers {
            let (key, value) = parse_key_value(header)?;
            builder = builder.header(key, value);
        }
        if let Some(data) = args.data {
            let body: JsonValue = serde_json::from_str(data)?;
            builder = builder.data(body);
        }

        let response = client.send(&builder.build()).await;
        self.output(&response.to_json());

        if response.ok() {
            Ok(())
        } else {
            Err(failure(&response))
        }
    }

    fn output(&self, value: &JsonValue) {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", text.unwrap_or_default());
    }
}

/// Borrowed arguments of the `request` command
struct RequestArgs<'a> {
    method: Method,
    path: &'a [String],
    params: &'a [String],
    headers: &'a [String],
    data: Option<&'a str>,
    ql: Option<&'a str>,
    limit: Option<u32>,
    app_auth: bool,
}

/// Split a `key=value` argument
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::config(format!(
            "Expected key=value, got '{arg}'"
        ))),
    }
}

fn failure(response: &Response) -> Error {
    match response.error() {
        Some(error) => Error::Other(format!("Request failed ({}): {error}", response.status())),
        None => Error::Other(format!("Request failed ({})", response.status())),
    }
}
