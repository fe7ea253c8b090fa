//! Configuration management for the GreenLine server
//!
//! This module handles loading and accessing application configuration.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use greenline_auth::model::{
    AUTH_CONSOLE_ENABLED, AUTH_ENABLED, DEFAULT_TOKEN_EXPIRE_SECONDS, TOKEN_EXPIRE_SECONDS,
    TOKEN_SECRET_KEY,
};
use greenline_common::{ApiType, Tier};

use super::constants::{
    DB_MAX_CONNECTIONS_PROPERTY, DB_URL_PROPERTY, DEFAULT_SERVER_PORT, SERVER_ADDRESS_PROPERTY,
    SERVER_CONTEXT_PATH_PROPERTY, SERVER_PORT_PROPERTY,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long = "no-watcher")]
    no_watcher: bool,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        Self::from_cli(args.port, args.database_url, args.no_watcher)
    }

    fn from_cli(port: Option<u16>, database_url: Option<String>, no_watcher: bool) -> Self {
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("greenline")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application.yml").required(false));

        if let Some(v) = port {
            config_builder = config_builder
                .set_override(SERVER_PORT_PROPERTY, i64::from(v))
                .expect("Failed to set port override");
        }
        if let Some(v) = database_url {
            config_builder = config_builder
                .set_override(DB_URL_PROPERTY, v)
                .expect("Failed to set database URL override");
        }
        if no_watcher {
            config_builder = config_builder
                .set_override("greenline.weather.watcher.enabled", false)
                .expect("Failed to set watcher override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    /// Configuration for tests, from key/value overrides only
    pub fn from_overrides(overrides: &[(&str, &str)]) -> Self {
        let mut builder = Config::builder();
        for (key, value) in overrides {
            builder = builder
                .set_override(*key, *value)
                .expect("Failed to set configuration override");
        }
        Configuration {
            config: builder.build().expect("Failed to build configuration"),
        }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS_PROPERTY)
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    pub fn server_context_path(&self) -> String {
        self.config
            .get_string(SERVER_CONTEXT_PATH_PROPERTY)
            .unwrap_or("".to_string())
    }

    pub fn version(&self) -> String {
        super::constants::GREENLINE_VERSION.to_string()
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn database_url(&self) -> String {
        self.config.get_string(DB_URL_PROPERTY).unwrap_or_default()
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let url = self.database_url();
        if url.is_empty() {
            anyhow::bail!("database url is not configured (db.url / DATABASE_URL)");
        }

        let max_connections = self
            .config
            .get_int(DB_MAX_CONNECTIONS_PROPERTY)
            .unwrap_or(20) as u32;

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = Database::connect(options).await?;
        Ok(connection)
    }

    // ========================================================================
    // Auth Configuration
    // ========================================================================

    pub fn auth_enabled(&self) -> bool {
        self.config.get_bool(AUTH_ENABLED).unwrap_or(true)
    }

    pub fn auth_console_enabled(&self) -> bool {
        self.config.get_bool(AUTH_CONSOLE_ENABLED).unwrap_or(true)
    }

    /// Whether a given API surface requires session authentication
    ///
    /// Open endpoints and webhook endpoints never use JWT; webhooks
    /// authenticate by signature instead.
    pub fn auth_enabled_for_api_type(&self, api_type: ApiType) -> bool {
        match api_type {
            ApiType::ConsoleApi => self.auth_console_enabled(),
            ApiType::BusinessApi => self.auth_enabled(),
            ApiType::OpenApi | ApiType::WebhookApi => false,
        }
    }

    pub fn token_secret_key(&self) -> String {
        self.config.get_string(TOKEN_SECRET_KEY).unwrap_or_default()
    }

    pub fn token_expire_seconds(&self) -> i64 {
        self.config
            .get_int(TOKEN_EXPIRE_SECONDS)
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS)
    }

    // ========================================================================
    // Integration Configuration
    // ========================================================================

    pub fn openrouter_base_url(&self) -> String {
        self.config
            .get_string("greenline.openrouter.base.url")
            .unwrap_or(greenline_integrations::llm::DEFAULT_BASE_URL.to_string())
    }

    pub fn openrouter_api_key(&self) -> String {
        self.config
            .get_string("greenline.openrouter.api.key")
            .unwrap_or_default()
    }

    pub fn openrouter_model(&self) -> String {
        self.config
            .get_string("greenline.openrouter.model")
            .unwrap_or("openai/gpt-4o-mini".to_string())
    }

    pub fn twilio_base_url(&self) -> String {
        self.config
            .get_string("greenline.twilio.base.url")
            .unwrap_or(greenline_integrations::sms::DEFAULT_BASE_URL.to_string())
    }

    pub fn twilio_account_sid(&self) -> String {
        self.config
            .get_string("greenline.twilio.account.sid")
            .unwrap_or_default()
    }

    pub fn twilio_auth_token(&self) -> String {
        self.config
            .get_string("greenline.twilio.auth.token")
            .unwrap_or_default()
    }

    pub fn twilio_from_number(&self) -> String {
        self.config
            .get_string("greenline.twilio.from.number")
            .unwrap_or_default()
    }

    pub fn sendgrid_base_url(&self) -> String {
        self.config
            .get_string("greenline.sendgrid.base.url")
            .unwrap_or(greenline_integrations::email::DEFAULT_BASE_URL.to_string())
    }

    pub fn sendgrid_api_key(&self) -> String {
        self.config
            .get_string("greenline.sendgrid.api.key")
            .unwrap_or_default()
    }

    pub fn sendgrid_from_email(&self) -> String {
        self.config
            .get_string("greenline.sendgrid.from.email")
            .unwrap_or("noreply@greenline365.com".to_string())
    }

    pub fn sendgrid_from_name(&self) -> String {
        self.config
            .get_string("greenline.sendgrid.from.name")
            .unwrap_or("GreenLine365".to_string())
    }

    pub fn openweather_base_url(&self) -> String {
        self.config
            .get_string("greenline.openweather.base.url")
            .unwrap_or(greenline_integrations::weather::DEFAULT_BASE_URL.to_string())
    }

    pub fn openweather_api_key(&self) -> String {
        self.config
            .get_string("greenline.openweather.api.key")
            .unwrap_or_default()
    }

    pub fn retell_webhook_secret(&self) -> String {
        self.config
            .get_string("greenline.retell.webhook.secret")
            .unwrap_or_default()
    }

    pub fn stripe_webhook_secret(&self) -> String {
        self.config
            .get_string("greenline.stripe.webhook.secret")
            .unwrap_or_default()
    }

    /// Map a Stripe price id onto a tier; unmapped prices read as tier1
    pub fn stripe_price_tier(&self, price_id: &str) -> Tier {
        if !price_id.is_empty() {
            if self
                .config
                .get_string("greenline.stripe.tier3.price.id")
                .map(|p| p == price_id)
                .unwrap_or(false)
            {
                return Tier::Tier3;
            }
            if self
                .config
                .get_string("greenline.stripe.tier2.price.id")
                .map(|p| p == price_id)
                .unwrap_or(false)
            {
                return Tier::Tier2;
            }
        }
        Tier::Tier1
    }

    // ========================================================================
    // Weather Watcher Configuration
    // ========================================================================

    pub fn weather_watcher_enabled(&self) -> bool {
        self.config
            .get_bool("greenline.weather.watcher.enabled")
            .unwrap_or(true)
    }

    pub fn weather_watcher_interval_secs(&self) -> u64 {
        self.config
            .get_int("greenline.weather.watcher.interval.seconds")
            .map(|v| v.max(60) as u64)
            .unwrap_or(1800)
    }

    // ========================================================================
    // Skill / Logging Configuration
    // ========================================================================

    pub fn skills_override_dir(&self) -> Option<String> {
        self.config.get_string("greenline.skills.dir").ok()
    }

    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string("greenline.logs.path").ok()
    }

    pub fn log_level(&self) -> String {
        self.config
            .get_string("greenline.logs.level")
            .unwrap_or("info".to_string())
    }

    pub fn log_console_enabled(&self) -> bool {
        self.config
            .get_bool("greenline.logs.console")
            .unwrap_or(true)
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.config
            .get_int("greenline.http.timeout.seconds")
            .map(|v| v as u64)
            .unwrap_or(greenline_integrations::DEFAULT_TIMEOUT_SECS)
    }

    pub fn audit_retention_days(&self) -> u32 {
        self.config
            .get_int("greenline.audit.retention.days")
            .map(|v| v.max(1) as u32)
            .unwrap_or(90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let configuration = Configuration::from_overrides(&[]);
        assert_eq!(configuration.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(configuration.server_address(), "0.0.0.0");
        assert!(configuration.auth_enabled());
        assert_eq!(configuration.token_expire_seconds(), 18000);
        assert_eq!(configuration.weather_watcher_interval_secs(), 1800);
        assert_eq!(configuration.openrouter_model(), "openai/gpt-4o-mini");
    }

    #[test]
    fn test_auth_enabled_per_api_type() {
        let configuration = Configuration::from_overrides(&[]);
        assert!(configuration.auth_enabled_for_api_type(ApiType::ConsoleApi));
        assert!(configuration.auth_enabled_for_api_type(ApiType::BusinessApi));
        assert!(!configuration.auth_enabled_for_api_type(ApiType::OpenApi));
        assert!(!configuration.auth_enabled_for_api_type(ApiType::WebhookApi));

        let disabled = Configuration::from_overrides(&[("greenline.auth.enabled", "false")]);
        assert!(!disabled.auth_enabled_for_api_type(ApiType::BusinessApi));
    }

    #[test]
    fn test_stripe_price_tier_mapping() {
        let configuration = Configuration::from_overrides(&[
            ("greenline.stripe.tier2.price.id", "price_t2"),
            ("greenline.stripe.tier3.price.id", "price_t3"),
        ]);
        assert_eq!(configuration.stripe_price_tier("price_t2"), Tier::Tier2);
        assert_eq!(configuration.stripe_price_tier("price_t3"), Tier::Tier3);
        assert_eq!(configuration.stripe_price_tier("price_unknown"), Tier::Tier1);
        assert_eq!(configuration.stripe_price_tier(""), Tier::Tier1);
    }

    #[test]
    fn test_watcher_interval_floor() {
        let configuration =
            Configuration::from_overrides(&[("greenline.weather.watcher.interval.seconds", "5")]);
        assert_eq!(configuration.weather_watcher_interval_secs(), 60);
    }
}
