//! Weather watcher
//!
//! A per-business loop calling the weather API and writing alert rows
//! when a threshold is crossed. Single pass per cycle, fixed sleep
//! between cycles, no retry/backoff; a failed fetch logs a warning and
//! moves to the next business.

use greenline_common::error::GreenLineError;
use greenline_integrations::email::EmailClient;
use greenline_integrations::weather::{CurrentConditions, WeatherClient};
use greenline_persistence::entity::weather_alerts::{self, alert_type, severity};
use greenline_persistence::entity::{businesses, platform_events};
use sea_orm::*;
use tokio::task::JoinHandle;

use super::{business, events};

/// An alert the evaluator wants written
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub alert_type: &'static str,
    pub severity: &'static str,
    pub headline: String,
    pub observed_value: f64,
    pub threshold_value: f64,
}

/// Evaluate configured thresholds against current conditions
///
/// One candidate per crossed threshold. Severity escalates to warning
/// at 25% past the threshold (or 5°C past, for temperatures).
pub fn evaluate_thresholds(
    biz: &businesses::Model,
    conditions: &CurrentConditions,
) -> Vec<AlertCandidate> {
    let mut candidates = Vec::new();

    if let Some(threshold) = biz.wind_threshold_kph
        && conditions.wind_kph >= threshold
    {
        candidates.push(AlertCandidate {
            alert_type: alert_type::HIGH_WIND,
            severity: if conditions.wind_kph >= threshold * 1.25 {
                severity::WARNING
            } else {
                severity::ADVISORY
            },
            headline: format!(
                "Wind at {:.0} km/h exceeds your {:.0} km/h threshold",
                conditions.wind_kph, threshold
            ),
            observed_value: conditions.wind_kph,
            threshold_value: threshold,
        });
    }

    if let Some(threshold) = biz.rain_threshold_mm
        && conditions.rain_mm_last_hour >= threshold
    {
        candidates.push(AlertCandidate {
            alert_type: alert_type::HEAVY_RAIN,
            severity: if conditions.rain_mm_last_hour >= threshold * 1.25 {
                severity::WARNING
            } else {
                severity::ADVISORY
            },
            headline: format!(
                "Rainfall at {:.1} mm/h exceeds your {:.1} mm/h threshold",
                conditions.rain_mm_last_hour, threshold
            ),
            observed_value: conditions.rain_mm_last_hour,
            threshold_value: threshold,
        });
    }

    if let Some(threshold) = biz.temp_low_threshold_c
        && conditions.temp_c <= threshold
    {
        candidates.push(AlertCandidate {
            alert_type: alert_type::FREEZE,
            severity: if conditions.temp_c <= threshold - 5.0 {
                severity::WARNING
            } else {
                severity::ADVISORY
            },
            headline: format!(
                "Temperature at {:.1}°C is below your {:.1}°C threshold",
                conditions.temp_c, threshold
            ),
            observed_value: conditions.temp_c,
            threshold_value: threshold,
        });
    }

    if let Some(threshold) = biz.temp_high_threshold_c
        && conditions.temp_c >= threshold
    {
        candidates.push(AlertCandidate {
            alert_type: alert_type::HEAT,
            severity: if conditions.temp_c >= threshold + 5.0 {
                severity::WARNING
            } else {
                severity::ADVISORY
            },
            headline: format!(
                "Temperature at {:.1}°C is above your {:.1}°C threshold",
                conditions.temp_c, threshold
            ),
            observed_value: conditions.temp_c,
            threshold_value: threshold,
        });
    }

    candidates
}

/// True when an unacknowledged alert of this type already exists
async fn duplicate_exists(
    db: &DatabaseConnection,
    business_id: &str,
    alert: &AlertCandidate,
) -> anyhow::Result<bool> {
    let existing = weather_alerts::Entity::find()
        .filter(weather_alerts::Column::BusinessId.eq(business_id))
        .filter(weather_alerts::Column::AlertType.eq(alert.alert_type))
        .filter(weather_alerts::Column::Acknowledged.eq(0))
        .one(db)
        .await?;

    Ok(existing.is_some())
}

async fn insert_alert(
    db: &DatabaseConnection,
    business_id: &str,
    alert: &AlertCandidate,
) -> anyhow::Result<weather_alerts::Model> {
    let entity = weather_alerts::ActiveModel {
        business_id: Set(business_id.to_string()),
        alert_type: Set(alert.alert_type.to_string()),
        severity: Set(alert.severity.to_string()),
        headline: Set(alert.headline.clone()),
        observed_value: Set(alert.observed_value),
        threshold_value: Set(alert.threshold_value),
        acknowledged: Set(0),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    Ok(entity.insert(db).await?)
}

/// Run one watcher cycle over every watchable business
///
/// Returns the number of alerts written.
pub async fn run_cycle(
    db: &DatabaseConnection,
    weather: &WeatherClient,
    email: Option<&EmailClient>,
) -> anyhow::Result<u64> {
    let watchable = business::find_weather_watchable(db).await?;
    let mut written = 0u64;

    for biz in watchable {
        // find_weather_watchable only returns located businesses
        let (Some(lat), Some(lon)) = (biz.latitude, biz.longitude) else {
            continue;
        };

        let conditions = match weather.current(lat, lon).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    business_id = %biz.id,
                    "Weather fetch failed, skipping business: {}",
                    e
                );
                continue;
            }
        };

        for candidate in evaluate_thresholds(&biz, &conditions) {
            if duplicate_exists(db, &biz.id, &candidate).await? {
                continue;
            }

            let alert = insert_alert(db, &biz.id, &candidate).await?;
            written += 1;

            events::record_best_effort(
                db,
                platform_events::event_type::WEATHER_ALERT,
                Some(biz.id.as_str()),
                "weather-watcher",
                Some(&serde_json::json!({
                    "alertId": alert.id,
                    "alertType": alert.alert_type,
                    "severity": alert.severity,
                })),
            )
            .await;

            if let Some(email) = email
                && let Some(ref to) = biz.contact_email
                && let Err(e) = email
                    .send(
                        to,
                        &format!("Weather alert for {}", biz.name),
                        &candidate.headline,
                    )
                    .await
            {
                tracing::warn!(business_id = %biz.id, "Weather alert email failed: {}", e);
            }
        }
    }

    Ok(written)
}

/// Handle to the spawned watcher task
pub struct WatcherHandle {
    handle: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Spawn the background watcher loop
pub fn spawn_watcher(
    db: DatabaseConnection,
    weather: WeatherClient,
    email: Option<EmailClient>,
    interval_secs: u64,
) -> WatcherHandle {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match run_cycle(&db, &weather, email.as_ref()).await {
                Ok(written) if written > 0 => {
                    tracing::info!(alerts = written, "Weather watcher cycle complete");
                }
                Ok(_) => {
                    tracing::debug!("Weather watcher cycle complete, no alerts");
                }
                Err(e) => {
                    tracing::error!("Weather watcher cycle failed: {}", e);
                }
            }
        }
    });

    WatcherHandle { handle }
}

// ---------------------------------------------------------------------------
// Alert read/acknowledge endpoints
// ---------------------------------------------------------------------------

pub async fn list_alerts(
    db: &DatabaseConnection,
    business_id: &str,
    include_acknowledged: bool,
) -> anyhow::Result<Vec<weather_alerts::Model>> {
    let mut query = weather_alerts::Entity::find()
        .filter(weather_alerts::Column::BusinessId.eq(business_id));

    if !include_acknowledged {
        query = query.filter(weather_alerts::Column::Acknowledged.eq(0));
    }

    let alerts = query
        .order_by(weather_alerts::Column::GmtCreate, Order::Desc)
        .all(db)
        .await?;

    Ok(alerts)
}

pub async fn acknowledge(
    db: &DatabaseConnection,
    business_id: &str,
    alert_id: u64,
) -> anyhow::Result<()> {
    let Some(entity) = weather_alerts::Entity::find_by_id(alert_id)
        .filter(weather_alerts::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
    else {
        return Err(GreenLineError::NotFound(format!("weather alert '{}'", alert_id)).into());
    };

    let mut alert: weather_alerts::ActiveModel = entity.into();
    alert.acknowledged = Set(1);
    alert.update(db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biz(
        wind: Option<f64>,
        rain: Option<f64>,
        low: Option<f64>,
        high: Option<f64>,
    ) -> businesses::Model {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        businesses::Model {
            id: "biz-1".to_string(),
            name: "Test Lawn Care".to_string(),
            slug: "test-lawn-care".to_string(),
            tier: "tier2".to_string(),
            industry: None,
            city: None,
            latitude: Some(41.88),
            longitude: Some(-87.63),
            timezone: None,
            phone: None,
            contact_email: None,
            status: businesses::status::ACTIVE.to_string(),
            stripe_customer_id: None,
            wind_threshold_kph: wind,
            rain_threshold_mm: rain,
            temp_low_threshold_c: low,
            temp_high_threshold_c: high,
            metadata: None,
            gmt_create: now,
            gmt_modified: now,
        }
    }

    fn conditions(temp: f64, wind: f64, rain: f64) -> CurrentConditions {
        CurrentConditions {
            temp_c: temp,
            wind_kph: wind,
            rain_mm_last_hour: rain,
            condition: "Clouds".to_string(),
        }
    }

    #[test]
    fn test_no_thresholds_no_alerts() {
        let alerts = evaluate_thresholds(&biz(None, None, None, None), &conditions(30.0, 80.0, 10.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_wind_threshold_crossed() {
        let alerts = evaluate_thresholds(&biz(Some(50.0), None, None, None), &conditions(20.0, 55.0, 0.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, alert_type::HIGH_WIND);
        assert_eq!(alerts[0].severity, severity::ADVISORY);
        assert_eq!(alerts[0].observed_value, 55.0);
    }

    #[test]
    fn test_wind_warning_severity() {
        let alerts = evaluate_thresholds(&biz(Some(50.0), None, None, None), &conditions(20.0, 63.0, 0.0));
        assert_eq!(alerts[0].severity, severity::WARNING);
    }

    #[test]
    fn test_below_threshold_no_alert() {
        let alerts = evaluate_thresholds(&biz(Some(50.0), None, None, None), &conditions(20.0, 49.9, 0.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_freeze_and_heat() {
        let freezing = evaluate_thresholds(&biz(None, None, Some(0.0), None), &conditions(-2.0, 0.0, 0.0));
        assert_eq!(freezing[0].alert_type, alert_type::FREEZE);
        assert_eq!(freezing[0].severity, severity::ADVISORY);

        let deep_freeze = evaluate_thresholds(&biz(None, None, Some(0.0), None), &conditions(-6.0, 0.0, 0.0));
        assert_eq!(deep_freeze[0].severity, severity::WARNING);

        let heat = evaluate_thresholds(&biz(None, None, None, Some(35.0)), &conditions(41.0, 0.0, 0.0));
        assert_eq!(heat[0].alert_type, alert_type::HEAT);
        assert_eq!(heat[0].severity, severity::WARNING);
    }

    #[test]
    fn test_multiple_thresholds_crossed() {
        let alerts = evaluate_thresholds(
            &biz(Some(40.0), Some(5.0), None, Some(30.0)),
            &conditions(32.0, 45.0, 6.0),
        );
        let types: Vec<&str> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![alert_type::HIGH_WIND, alert_type::HEAVY_RAIN, alert_type::HEAT]
        );
    }
}
