//! Append-only record of who changed which document.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// What a service hands to the sink after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub collection: &'static str,
    pub document_id: Uuid,
    pub action: AuditAction,
    /// `None` for writes made outside a request (seeding, CLI).
    pub user_id: Option<Uuid>,
}

/// A stored audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub collection: String,
    pub document_id: Uuid,
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

pub trait AuditSink: Send + Sync + Clone {
    fn record(&self, entry: &NewAuditEntry) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudit;

impl AuditSink for NullAudit {
    async fn record(&self, _entry: &NewAuditEntry) -> Result<(), AppError> {
        Ok(())
    }
}
