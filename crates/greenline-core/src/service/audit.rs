//! Audit logging service
//!
//! Provides comprehensive operation logging for audit purposes.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use greenline_persistence::entity::audit_log;

/// Operation type constants
pub mod operation {
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const LOGIN: &str = "LOGIN";
    pub const PUBLISH: &str = "PUBLISH";
    pub const ACTIVATE: &str = "ACTIVATE";
    pub const ACKNOWLEDGE: &str = "ACKNOWLEDGE";
    pub const NUDGE: &str = "NUDGE";
    pub const WEBHOOK: &str = "WEBHOOK";
    pub const TIER_CHANGE: &str = "TIER_CHANGE";
}

/// Resource type constants
pub mod resource {
    pub const BUSINESS: &str = "BUSINESS";
    pub const MEMBERSHIP: &str = "MEMBERSHIP";
    pub const LISTING: &str = "LISTING";
    pub const LEAD: &str = "LEAD";
    pub const COUPON: &str = "COUPON";
    pub const POLL: &str = "POLL";
    pub const USER: &str = "USER";
    pub const CALL: &str = "CALL";
    pub const MEMORY: &str = "MEMORY";
    pub const WEATHER_ALERT: &str = "WEATHER_ALERT";
}

/// Operation result constants
pub mod result {
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAILURE: &str = "FAILURE";
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Option<u64>,
    pub operation: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub business_id: Option<String>,
    pub operator: String,
    pub source_ip: Option<String>,
    pub result: String,
    pub error_message: Option<String>,
    pub details: Option<String>,
    pub gmt_create: Option<chrono::NaiveDateTime>,
}

impl Default for AuditLogEntry {
    fn default() -> Self {
        Self {
            id: None,
            operation: String::new(),
            resource_type: String::new(),
            resource_id: None,
            business_id: None,
            operator: "anonymous".to_string(),
            source_ip: None,
            result: result::SUCCESS.to_string(),
            error_message: None,
            details: None,
            gmt_create: None,
        }
    }
}

impl AuditLogEntry {
    /// Create a new audit log entry builder
    pub fn builder() -> AuditLogBuilder {
        AuditLogBuilder::new()
    }
}

/// Builder for AuditLogEntry
pub struct AuditLogBuilder {
    entry: AuditLogEntry,
}

impl AuditLogBuilder {
    pub fn new() -> Self {
        Self {
            entry: AuditLogEntry::default(),
        }
    }

    pub fn operation(mut self, op: &str) -> Self {
        self.entry.operation = op.to_string();
        self
    }

    pub fn resource_type(mut self, rt: &str) -> Self {
        self.entry.resource_type = rt.to_string();
        self
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.entry.resource_id = Some(id.into());
        self
    }

    pub fn business_id(mut self, business: impl Into<String>) -> Self {
        self.entry.business_id = Some(business.into());
        self
    }

    pub fn operator(mut self, op: impl Into<String>) -> Self {
        self.entry.operator = op.into();
        self
    }

    pub fn source_ip(mut self, ip: impl Into<String>) -> Self {
        self.entry.source_ip = Some(ip.into());
        self
    }

    pub fn success(mut self) -> Self {
        self.entry.result = result::SUCCESS.to_string();
        self
    }

    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.entry.result = result::FAILURE.to_string();
        self.entry.error_message = Some(error.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.entry.details = Some(details.into());
        self
    }

    pub fn details_json<T: Serialize>(mut self, details: &T) -> Self {
        self.entry.details = serde_json::to_string(details).ok();
        self
    }

    pub fn build(self) -> AuditLogEntry {
        self.entry
    }
}

impl Default for AuditLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Page info for pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub total_count: u64,
    pub page_number: u32,
    pub pages_available: u64,
    pub page_items: Vec<AuditLogEntry>,
}

/// Search criteria for audit logs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogSearch {
    pub operation: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub business_id: Option<String>,
    pub operator: Option<String>,
    pub result: Option<String>,
    pub start_time: Option<chrono::NaiveDateTime>,
    pub end_time: Option<chrono::NaiveDateTime>,
}

/// Log an operation to the audit log
pub async fn log_operation(db: &DatabaseConnection, entry: AuditLogEntry) -> anyhow::Result<u64> {
    let now = chrono::Utc::now().naive_utc();

    let active = audit_log::ActiveModel {
        operation: Set(entry.operation),
        resource_type: Set(entry.resource_type),
        resource_id: Set(entry.resource_id),
        business_id: Set(entry.business_id),
        operator: Set(entry.operator),
        source_ip: Set(entry.source_ip),
        result: Set(entry.result),
        error_message: Set(entry.error_message),
        details: Set(entry.details),
        gmt_create: Set(now),
        ..Default::default()
    };

    let inserted = active.insert(db).await?;
    Ok(inserted.id)
}

/// Log an operation, swallowing failures
///
/// Audit writes must never fail the request that triggered them.
pub async fn log_operation_best_effort(db: &DatabaseConnection, entry: AuditLogEntry) {
    if let Err(e) = log_operation(db, entry).await {
        tracing::warn!("Failed to write audit log entry: {}", e);
    }
}

fn to_entry(m: audit_log::Model) -> AuditLogEntry {
    AuditLogEntry {
        id: Some(m.id),
        operation: m.operation,
        resource_type: m.resource_type,
        resource_id: m.resource_id,
        business_id: m.business_id,
        operator: m.operator,
        source_ip: m.source_ip,
        result: m.result,
        error_message: m.error_message,
        details: m.details,
        gmt_create: Some(m.gmt_create),
    }
}

/// Search audit logs with pagination
pub async fn search_logs(
    db: &DatabaseConnection,
    search: &AuditLogSearch,
    page_number: u32,
    page_size: u32,
) -> anyhow::Result<AuditLogPage> {
    let mut query = audit_log::Entity::find();

    // Apply filters
    if let Some(ref op) = search.operation {
        query = query.filter(audit_log::Column::Operation.eq(op));
    }
    if let Some(ref rt) = search.resource_type {
        query = query.filter(audit_log::Column::ResourceType.eq(rt));
    }
    if let Some(ref rid) = search.resource_id {
        query = query.filter(audit_log::Column::ResourceId.like(format!("%{}%", rid)));
    }
    if let Some(ref business) = search.business_id {
        query = query.filter(audit_log::Column::BusinessId.eq(business));
    }
    if let Some(ref operator) = search.operator {
        query = query.filter(audit_log::Column::Operator.eq(operator));
    }
    if let Some(ref result) = search.result {
        query = query.filter(audit_log::Column::Result.eq(result));
    }
    if let Some(start) = search.start_time {
        query = query.filter(audit_log::Column::GmtCreate.gte(start));
    }
    if let Some(end) = search.end_time {
        query = query.filter(audit_log::Column::GmtCreate.lte(end));
    }

    // Order by creation time descending (newest first)
    query = query.order_by(audit_log::Column::GmtCreate, Order::Desc);

    // Get total count
    let total_count = query.clone().count(db).await?;

    // Calculate pagination
    let pages_available = total_count.div_ceil(page_size as u64);
    let offset = (page_number.saturating_sub(1)) * page_size;

    // Get page items
    let models = query
        .offset(offset as u64)
        .limit(page_size as u64)
        .all(db)
        .await?;

    let page_items: Vec<AuditLogEntry> = models.into_iter().map(to_entry).collect();

    Ok(AuditLogPage {
        total_count,
        page_number,
        pages_available,
        page_items,
    })
}

/// Get a single audit log entry by ID
pub async fn get_log(db: &DatabaseConnection, id: u64) -> anyhow::Result<Option<AuditLogEntry>> {
    let model = audit_log::Entity::find_by_id(id).one(db).await?;

    Ok(model.map(to_entry))
}

/// Delete old audit logs (retention policy)
pub async fn cleanup_old_logs(db: &DatabaseConnection, retention_days: u32) -> anyhow::Result<u64> {
    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);

    let result = audit_log::Entity::delete_many()
        .filter(audit_log::Column::GmtCreate.lt(cutoff))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Count operations by type for statistics
pub async fn count_by_operation(
    db: &DatabaseConnection,
    business_id: Option<&str>,
    start_time: Option<chrono::NaiveDateTime>,
    end_time: Option<chrono::NaiveDateTime>,
) -> anyhow::Result<std::collections::HashMap<String, u64>> {
    let mut query = audit_log::Entity::find();

    if let Some(business) = business_id {
        query = query.filter(audit_log::Column::BusinessId.eq(business));
    }
    if let Some(start) = start_time {
        query = query.filter(audit_log::Column::GmtCreate.gte(start));
    }
    if let Some(end) = end_time {
        query = query.filter(audit_log::Column::GmtCreate.lte(end));
    }

    let models = query.all(db).await?;

    let mut counts = std::collections::HashMap::new();
    for m in models {
        *counts.entry(m.operation).or_insert(0) += 1;
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let entry = AuditLogEntry::builder().build();
        assert_eq!(entry.operator, "anonymous");
        assert_eq!(entry.result, result::SUCCESS);
        assert!(entry.resource_id.is_none());
    }

    #[test]
    fn test_builder_failure() {
        let entry = AuditLogEntry::builder()
            .operation(operation::DELETE)
            .resource_type(resource::LEAD)
            .resource_id("lead-1")
            .business_id("biz-1")
            .operator("kelly")
            .failure("lead not found")
            .build();

        assert_eq!(entry.operation, "DELETE");
        assert_eq!(entry.result, result::FAILURE);
        assert_eq!(entry.error_message.as_deref(), Some("lead not found"));
        assert_eq!(entry.business_id.as_deref(), Some("biz-1"));
    }

    #[test]
    fn test_builder_details_json() {
        let entry = AuditLogEntry::builder()
            .details_json(&serde_json::json!({"tier": "tier2"}))
            .build();
        assert_eq!(entry.details.as_deref(), Some(r#"{"tier":"tier2"}"#));
    }
}
