//! Run one account intent against a live accounts API.
//!
//! Notifications the coordinator dispatches are written to stdout as JSON
//! lines; forced navigations and diagnostics go to the JSON log on stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use client::domain::{AccountActions, AccountCommand, Intent, Outcome, Payload, UserId};
use client::outbound::http::HttpTransport;
use client::outbound::navigation::TracingNavigator;
use client::outbound::store::ChannelStore;
use client::settings::ClientSettings;
use ortho_config::OrthoConfig;
use serde_json::Value;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `account-cli` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "account-cli",
    about = "Run one account intent and print the store notifications it produces",
    version
)]
struct CliArgs {
    /// Accounts API origin. Overrides `ACCOUNT_CLIENT_BASE_URL`.
    #[arg(long = "base-url", value_name = "url")]
    base_url: Option<String>,
    #[command(subcommand)]
    intent: IntentArgs,
}

#[derive(Debug, Subcommand)]
enum IntentArgs {
    /// Register a new account.
    CreateUser(FieldArgs),
    /// Update an account's profile.
    UpdateUser(TargetedFieldArgs),
    /// Fetch the signed-in account.
    CurrentUser,
    /// Fetch an account by identifier.
    GetUser(TargetedFieldArgs),
    /// Start a session.
    LogIn(FieldArgs),
    /// End the session.
    LogOut,
    /// Request a password reset token.
    PasswordToken(FieldArgs),
    /// Set a new password using a reset token.
    CreatePassword(TargetedFieldArgs),
}

#[derive(Debug, Args)]
struct FieldArgs {
    /// Payload field as `key=value`; values are parsed as JSON when possible.
    #[arg(long = "field", value_name = "key=value", value_parser = parse_field)]
    fields: Vec<(String, Value)>,
}

#[derive(Debug, Args)]
struct TargetedFieldArgs {
    /// Target account identifier.
    #[arg(long = "id", value_name = "id")]
    id: String,
    #[command(flatten)]
    fields: FieldArgs,
}

impl FieldArgs {
    fn into_payload(self) -> Payload {
        self.fields.into_iter().collect()
    }
}

impl IntentArgs {
    fn into_command(self) -> AccountCommand {
        match self {
            Self::CreateUser(args) => AccountCommand::CreateUser {
                data: args.into_payload(),
            },
            Self::UpdateUser(args) => AccountCommand::UpdateUser {
                id: UserId::from(args.id),
                data: args.fields.into_payload(),
            },
            Self::CurrentUser => AccountCommand::GetCurrentUser,
            Self::GetUser(args) => AccountCommand::GetUser {
                id: UserId::from(args.id),
                options: args.fields.into_payload(),
            },
            Self::LogIn(args) => AccountCommand::LogInUser {
                credentials: args.into_payload(),
            },
            Self::LogOut => AccountCommand::LogOutUser,
            Self::PasswordToken(args) => AccountCommand::GetUserPasswordToken {
                contact: args.into_payload(),
            },
            Self::CreatePassword(args) => AccountCommand::CreateUserPassword {
                id: UserId::from(args.id),
                data: args.fields.into_payload(),
            },
        }
    }
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (raw_key, raw_value) = raw
        .split_once('=')
        .ok_or_else(|| format!("field must be key=value, got '{raw}'"))?;
    let key = raw_key.trim();
    if key.is_empty() {
        return Err("field key must not be empty".to_owned());
    }
    let value =
        serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.to_owned()));
    Ok((key.to_owned(), value))
}

fn main() -> io::Result<()> {
    let args = CliArgs::try_parse().unwrap_or_else(|error| error.exit());

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings(args.base_url)?;
    let command = args.intent.into_command();
    let intent = command.intent();

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    let outcome = runtime.block_on(execute(&settings, command))?;
    ensure_succeeded(intent, outcome)
}

fn load_settings(base_url: Option<String>) -> io::Result<ClientSettings> {
    let mut settings = ClientSettings::load_from_iter([OsString::from("account-cli")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    if base_url.is_some() {
        settings.base_url = base_url;
    }
    Ok(settings)
}

fn ensure_succeeded(intent: Intent, outcome: Outcome) -> io::Result<()> {
    match outcome {
        Outcome::Succeeded => Ok(()),
        Outcome::Failed | Outcome::Interrupted => Err(io::Error::other(format!(
            "{intent} did not succeed: {outcome:?}"
        ))),
    }
}

async fn execute(settings: &ClientSettings, command: AccountCommand) -> io::Result<Outcome> {
    let transport = HttpTransport::from_settings(settings)
        .map_err(|error| io::Error::other(format!("build transport: {error}")))?;
    let navigator = TracingNavigator::new(transport.base_url().clone());
    let (store, mut notifications) = ChannelStore::new();
    let actions = AccountActions::new(Arc::new(transport), Arc::new(store), Arc::new(navigator));

    let outcome = actions.perform(command).await;
    drop(actions);

    let mut stdout = io::stdout().lock();
    while let Ok(notification) = notifications.try_recv() {
        serde_json::to_writer(&mut stdout, &notification).map_err(io::Error::other)?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use env_lock::lock_env;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("email=a@example.com", "email", json!("a@example.com"))]
    #[case("page=2", "page", json!(2))]
    #[case("remember=true", "remember", json!(true))]
    #[case("tags=[\"a\"]", "tags", json!(["a"]))]
    #[case("note=a=b", "note", json!("a=b"))]
    fn fields_parse_json_values_or_fall_back_to_strings(
        #[case] raw: &str,
        #[case] key: &str,
        #[case] value: Value,
    ) {
        assert_eq!(parse_field(raw), Ok((key.to_owned(), value)));
    }

    #[rstest]
    #[case("no-separator")]
    #[case("=value")]
    fn malformed_fields_are_rejected(#[case] raw: &str) {
        assert!(parse_field(raw).is_err());
    }

    #[rstest]
    fn subcommands_map_to_commands() {
        let args = CliArgs::try_parse_from([
            "account-cli",
            "get-user",
            "--id",
            "42",
            "--field",
            "include=posts",
        ])
        .expect("arguments parse");

        let mut options = Payload::new();
        options.insert("include".to_owned(), json!("posts"));
        assert_eq!(
            args.intent.into_command(),
            AccountCommand::GetUser {
                id: UserId::from("42"),
                options,
            }
        );
    }

    #[rstest]
    fn only_success_exits_cleanly() {
        assert!(ensure_succeeded(Intent::LogOutUser, Outcome::Succeeded).is_ok());
        let failed = ensure_succeeded(Intent::LogOutUser, Outcome::Failed)
            .expect_err("failure is reported");
        assert_eq!(failed.to_string(), "log_out_user did not succeed: Failed");
        assert!(ensure_succeeded(Intent::GetUser, Outcome::Interrupted).is_err());
    }

    #[rstest]
    fn settings_load_without_environment_and_honour_the_flag() {
        let _guard = lock_env([
            ("ACCOUNT_CLIENT_BASE_URL", None::<String>),
            ("ACCOUNT_CLIENT_REQUEST_TIMEOUT_SECONDS", None::<String>),
            ("ACCOUNT_CLIENT_USER_AGENT", None::<String>),
        ]);

        let defaults = load_settings(None).expect("settings load");
        assert_eq!(
            defaults.base_url().expect("default parses").as_str(),
            "http://localhost:8080/"
        );

        let overridden =
            load_settings(Some("https://sets.example".to_owned())).expect("settings load");
        assert_eq!(
            overridden.base_url().expect("override parses").as_str(),
            "https://sets.example/"
        );
    }

    #[tokio::test]
    async fn invalid_base_url_is_an_error_before_any_request() {
        let settings = ClientSettings {
            base_url: Some("not a url".to_owned()),
            request_timeout_seconds: 1,
            user_agent: None,
        };

        let error = execute(&settings, AccountCommand::LogOutUser)
            .await
            .expect_err("base URL is rejected");
        assert!(error.to_string().starts_with("build transport:"), "{error}");
    }

    #[rstest]
    fn base_url_flag_is_optional() {
        let args = CliArgs::try_parse_from(["account-cli", "log-out"]).expect("arguments parse");
        assert!(args.base_url.is_none());
        assert_eq!(args.intent.into_command(), AccountCommand::LogOutUser);
    }
}
