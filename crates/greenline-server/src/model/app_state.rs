//! Application state management
//!
//! This module defines the central application state shared across all
//! handlers.

use greenline_core::SkillRegistry;
use greenline_integrations::email::EmailClient;
use greenline_integrations::llm::LlmClient;
use greenline_integrations::sms::SmsClient;
use greenline_integrations::weather::WeatherClient;
use sea_orm::DatabaseConnection;

use super::config::Configuration;

/// Application state shared across all handlers
///
/// Everything in here is either immutable configuration or an internally
/// synchronized client; handlers never coordinate through it.
pub struct AppState {
    pub configuration: Configuration,
    pub database_connection: DatabaseConnection,
    pub llm: LlmClient,
    pub sms: SmsClient,
    pub email: EmailClient,
    pub weather: WeatherClient,
    pub skills: SkillRegistry,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("database_connection", &"<DatabaseConnection>")
            .field("llm", &"<LlmClient>")
            .field("sms", &"<SmsClient>")
            .field("email", &"<EmailClient>")
            .field("weather", &"<WeatherClient>")
            .field("skills", &self.skills.names())
            .finish()
    }
}

impl AppState {
    pub fn db(&self) -> &DatabaseConnection {
        &self.database_connection
    }
}

impl AppState {
    /// Build the shared integration clients from configuration
    pub fn new(configuration: Configuration, database_connection: DatabaseConnection) -> Self {
        let http = greenline_integrations::http_client(configuration.http_timeout_secs());

        let llm = LlmClient::new(
            http.clone(),
            &configuration.openrouter_base_url(),
            &configuration.openrouter_api_key(),
            &configuration.openrouter_model(),
        );
        let sms = SmsClient::new(
            http.clone(),
            &configuration.twilio_base_url(),
            &configuration.twilio_account_sid(),
            &configuration.twilio_auth_token(),
            &configuration.twilio_from_number(),
        );
        let email = EmailClient::new(
            http.clone(),
            &configuration.sendgrid_base_url(),
            &configuration.sendgrid_api_key(),
            &configuration.sendgrid_from_email(),
            &configuration.sendgrid_from_name(),
        );
        let weather = WeatherClient::new(
            http,
            &configuration.openweather_base_url(),
            &configuration.openweather_api_key(),
        );

        let skills = match configuration.skills_override_dir() {
            Some(dir) => SkillRegistry::with_overrides(std::path::Path::new(&dir)),
            None => SkillRegistry::new(),
        };

        Self {
            configuration,
            database_connection,
            llm,
            sms,
            email,
            weather,
            skills,
        }
    }
}
