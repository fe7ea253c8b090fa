//! Call log and nudge tracking service
//!
//! Outcomes are inferred post hoc by string-matching the AI-produced
//! call summary; the webhook upsert is idempotent on the provider call
//! id.

use greenline_common::error::GreenLineError;
use greenline_common::normalize_phone;
use greenline_integrations::sms::SmsClient;
use greenline_integrations::voice::RetellCall;
use greenline_persistence::Page;
use greenline_persistence::entity::call_logs::{self, outcome};
use sea_orm::sea_query::Asterisk;
use sea_orm::*;

/// Maximum SMS follow-ups per call
pub const MAX_NUDGES: i32 = 3;

/// Minimum spacing between nudges for the same call
pub const NUDGE_SPACING_HOURS: i64 = 24;

/// Classify an AI-produced call summary into an outcome
///
/// Case-insensitive first-match keyword scan; anything unmatched is
/// unclassified.
pub fn classify_outcome(summary: &str) -> &'static str {
    let lowered = summary.to_lowercase();

    const RULES: &[(&str, &[&str])] = &[
        (outcome::BOOKED, &["booked", "appointment scheduled", "scheduled an appointment", "confirmed a booking"]),
        (outcome::CALLBACK_REQUESTED, &["call back", "callback", "call them back", "follow up call", "follow-up call"]),
        (outcome::NOT_INTERESTED, &["not interested", "declined", "do not call", "no longer interested"]),
        (outcome::VOICEMAIL, &["voicemail", "left a message", "answering machine"]),
        (outcome::NO_ANSWER, &["no answer", "did not answer", "didn't answer", "unanswered"]),
    ];

    for (result, keywords) in RULES {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return result;
        }
    }

    outcome::UNCLASSIFIED
}

/// Result of a webhook upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Insert or update the call log row for a webhook delivery
pub async fn upsert_from_webhook(
    db: &DatabaseConnection,
    business_id: &str,
    call: &RetellCall,
) -> anyhow::Result<(call_logs::Model, UpsertOutcome)> {
    let classified = call
        .summary()
        .map(classify_outcome)
        .unwrap_or(outcome::UNCLASSIFIED);

    let existing = call_logs::Entity::find()
        .filter(call_logs::Column::ProviderCallId.eq(&call.call_id))
        .one(db)
        .await?;

    match existing {
        Some(entity) => {
            let mut log: call_logs::ActiveModel = entity.into();
            if let Some(duration) = call.duration_seconds() {
                log.duration_seconds = Set(Some(duration));
            }
            if let Some(transcript) = &call.transcript {
                log.transcript = Set(Some(transcript.clone()));
            }
            if let Some(summary) = call.summary() {
                log.summary = Set(Some(summary.to_string()));
                log.outcome = Set(classified.to_string());
            }
            let updated = log.update(db).await?;
            Ok((updated, UpsertOutcome::Updated))
        }
        None => {
            let entity = call_logs::ActiveModel {
                business_id: Set(business_id.to_string()),
                provider_call_id: Set(call.call_id.clone()),
                caller_number: Set(call.from_number.clone()),
                callee_number: Set(call.to_number.clone()),
                duration_seconds: Set(call.duration_seconds()),
                transcript: Set(call.transcript.clone()),
                summary: Set(call.summary().map(|s| s.to_string())),
                outcome: Set(classified.to_string()),
                nudge_count: Set(0),
                last_nudge_at: Set(None),
                gmt_create: Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            };
            let inserted = entity.insert(db).await?;
            Ok((inserted, UpsertOutcome::Inserted))
        }
    }
}

async fn find_owned(
    db: &DatabaseConnection,
    business_id: &str,
    call_log_id: u64,
) -> anyhow::Result<call_logs::Model> {
    call_logs::Entity::find_by_id(call_log_id)
        .filter(call_logs::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
        .ok_or_else(|| GreenLineError::NotFound(format!("call log '{}'", call_log_id)).into())
}

pub async fn get(
    db: &DatabaseConnection,
    business_id: &str,
    call_log_id: u64,
) -> anyhow::Result<call_logs::Model> {
    find_owned(db, business_id, call_log_id).await
}

pub async fn search_page(
    db: &DatabaseConnection,
    business_id: &str,
    outcome_filter: Option<&str>,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<call_logs::Model>> {
    let mut query =
        call_logs::Entity::find().filter(call_logs::Column::BusinessId.eq(business_id));

    if let Some(outcome_filter) = outcome_filter {
        query = query.filter(call_logs::Column::Outcome.eq(outcome_filter));
    }

    let total_count = query
        .clone()
        .select_only()
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default() as u64;

    if total_count == 0 {
        return Ok(Page::default());
    }

    let offset = (page_no.saturating_sub(1)) * page_size;
    let page_items = query
        .order_by(call_logs::Column::GmtCreate, Order::Desc)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?;

    Ok(Page::new(total_count, page_no, page_size, page_items))
}

/// Check whether another nudge is allowed right now
///
/// Rules: outcome must be callback_requested, at most `MAX_NUDGES`
/// nudges total, and at least `NUDGE_SPACING_HOURS` since the last one.
pub fn nudge_allowed(
    log: &call_logs::Model,
    now: chrono::NaiveDateTime,
) -> Result<(), GreenLineError> {
    if log.outcome != outcome::CALLBACK_REQUESTED {
        return Err(GreenLineError::IllegalArgument(format!(
            "call outcome '{}' is not eligible for a nudge",
            log.outcome
        )));
    }
    if log.nudge_count >= MAX_NUDGES {
        return Err(GreenLineError::NudgeLimitReached(log.provider_call_id.clone()));
    }
    if let Some(last) = log.last_nudge_at {
        let elapsed = now - last;
        if elapsed < chrono::Duration::hours(NUDGE_SPACING_HOURS) {
            return Err(GreenLineError::IllegalArgument(format!(
                "nudge already sent within the last {} hours",
                NUDGE_SPACING_HOURS
            )));
        }
    }
    Ok(())
}

/// Send an SMS follow-up for a callback-requested call
pub async fn nudge(
    db: &DatabaseConnection,
    sms: &SmsClient,
    business_id: &str,
    call_log_id: u64,
    message: &str,
) -> anyhow::Result<call_logs::Model> {
    let log = find_owned(db, business_id, call_log_id).await?;

    let now = chrono::Utc::now().naive_utc();
    nudge_allowed(&log, now)?;

    let raw_number = log
        .caller_number
        .clone()
        .ok_or_else(|| GreenLineError::IllegalArgument("call has no caller number".to_string()))?;
    let to = normalize_phone(&raw_number).ok_or_else(|| {
        GreenLineError::IllegalArgument(format!("caller number '{}' is not usable", raw_number))
    })?;

    sms.send(&to, message)
        .await
        .map_err(|e| GreenLineError::UpstreamError(e.to_string()))?;

    let nudge_count = log.nudge_count + 1;
    let mut active: call_logs::ActiveModel = log.into();
    active.nudge_count = Set(nudge_count);
    active.last_nudge_at = Set(Some(now));
    let updated = active.update(db).await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(outcome_str: &str, nudge_count: i32, last: Option<i64>) -> call_logs::Model {
        let base = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        call_logs::Model {
            id: 1,
            business_id: "biz-1".to_string(),
            provider_call_id: "call_1".to_string(),
            caller_number: Some("+15558675309".to_string()),
            callee_number: None,
            duration_seconds: Some(60),
            transcript: None,
            summary: None,
            outcome: outcome_str.to_string(),
            nudge_count,
            last_nudge_at: last.map(|hours_ago| base - chrono::Duration::hours(hours_ago)),
            gmt_create: base,
        }
    }

    fn now() -> chrono::NaiveDateTime {
        chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc()
    }

    #[test]
    fn test_classify_outcome_booked() {
        assert_eq!(
            classify_outcome("The caller BOOKED a cleaning for Tuesday."),
            outcome::BOOKED
        );
        assert_eq!(
            classify_outcome("An appointment scheduled for next week."),
            outcome::BOOKED
        );
    }

    #[test]
    fn test_classify_outcome_callback() {
        assert_eq!(
            classify_outcome("Customer asked us to call back tomorrow."),
            outcome::CALLBACK_REQUESTED
        );
    }

    #[test]
    fn test_classify_outcome_not_interested() {
        assert_eq!(
            classify_outcome("Caller said they are not interested."),
            outcome::NOT_INTERESTED
        );
    }

    #[test]
    fn test_classify_outcome_voicemail_and_no_answer() {
        assert_eq!(classify_outcome("Reached voicemail."), outcome::VOICEMAIL);
        assert_eq!(classify_outcome("No answer after six rings."), outcome::NO_ANSWER);
    }

    #[test]
    fn test_classify_outcome_unclassified() {
        assert_eq!(classify_outcome("General inquiry about hours."), outcome::UNCLASSIFIED);
        assert_eq!(classify_outcome(""), outcome::UNCLASSIFIED);
    }

    #[test]
    fn test_classify_outcome_first_match_wins() {
        // Mentions both booking and voicemail; booking is checked first
        assert_eq!(
            classify_outcome("Left a voicemail after the caller booked."),
            outcome::BOOKED
        );
    }

    #[test]
    fn test_nudge_allowed_happy_path() {
        let log = log_with(outcome::CALLBACK_REQUESTED, 0, None);
        assert!(nudge_allowed(&log, now()).is_ok());
    }

    #[test]
    fn test_nudge_rejected_for_wrong_outcome() {
        let log = log_with(outcome::BOOKED, 0, None);
        assert!(nudge_allowed(&log, now()).is_err());
    }

    #[test]
    fn test_nudge_rejected_at_limit() {
        let log = log_with(outcome::CALLBACK_REQUESTED, MAX_NUDGES, Some(48));
        assert!(matches!(
            nudge_allowed(&log, now()),
            Err(GreenLineError::NudgeLimitReached(_))
        ));
    }

    #[test]
    fn test_nudge_rejected_within_spacing() {
        let log = log_with(outcome::CALLBACK_REQUESTED, 1, Some(2));
        assert!(nudge_allowed(&log, now()).is_err());

        let log = log_with(outcome::CALLBACK_REQUESTED, 1, Some(25));
        assert!(nudge_allowed(&log, now()).is_ok());
    }
}
