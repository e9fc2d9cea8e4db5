//! Typed wrappers for the admin-only endpoints
//!
//! Detail pages call a handful of endpoints that fall outside the generic
//! CRUD surface: dashboard statistics, per-user match/photo listings, the
//! ban flow, report review, and notification dispatch. Each wrapper is an
//! opaque call through the shared client; retry and refresh behavior comes
//! from there.

use crate::http::{ApiClient, RequestOptions};
use chrono::{DateTime, Utc};
use log::info;
use matchdesk_core::{
    AdminResult, DashboardOverview, MatchRecord, NotificationType, Photo, Report, ReportStatus,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Payload for banning a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub reason: String,
    /// End of the ban; a permanent ban omits this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banned_until: Option<DateTime<Utc>>,
}

/// Payload for reviewing a report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReview {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

/// Payload for a targeted or panel-wide in-app notification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Omitted to address every user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}

/// Payload for a push broadcast to all devices
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastPush {
    pub title: String,
    pub message: String,
    pub data: PushData,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushData {
    #[serde(rename = "type")]
    pub kind: NotificationType,
}

/// Admin-only operations over a shared API client
pub struct AdminApi {
    client: Arc<ApiClient>,
}

impl AdminApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Aggregate statistics and recent activity for the landing page
    pub async fn dashboard_overview(&self) -> AdminResult<DashboardOverview> {
        let value = self.client.get("/user/admin/dashboard", Vec::new()).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// All matches one user has participated in
    pub async fn user_matches(&self, user_id: &str) -> AdminResult<Vec<MatchRecord>> {
        let value = self
            .client
            .get(&format!("/matching/user/{}", user_id), Vec::new())
            .await?;
        Self::enveloped_items(value)
    }

    /// All photo sets one user has uploaded
    pub async fn user_photos(&self, user_id: &str) -> AdminResult<Vec<Photo>> {
        let value = self
            .client
            .get(&format!("/photos/user/{}", user_id), Vec::new())
            .await?;
        Self::enveloped_items(value)
    }

    /// Ban a user, optionally until a given time
    pub async fn ban_user(&self, user_id: &str, request: &BanRequest) -> AdminResult<()> {
        self.client
            .post(
                &format!("/user/{}/ban", user_id),
                serde_json::to_value(request)?,
            )
            .await?;
        info!("Banned user {}: {}", user_id, request.reason);
        Ok(())
    }

    /// Lift a user's ban
    pub async fn unban_user(&self, user_id: &str) -> AdminResult<()> {
        self.client
            .send(
                Method::POST,
                &format!("/user/{}/unban", user_id),
                RequestOptions::new(),
            )
            .await?;
        info!("Unbanned user {}", user_id);
        Ok(())
    }

    /// Review a report, updating its status and moderator note
    pub async fn review_report(
        &self,
        report_id: &str,
        review: &ReportReview,
    ) -> AdminResult<Report> {
        let value = self
            .client
            .patch(
                &format!("/reports/{}", report_id),
                serde_json::to_value(review)?,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send an in-app notification, targeted or to everyone
    pub async fn send_notification(&self, request: &SendNotification) -> AdminResult<()> {
        self.client
            .post("/notifications/admin/send", serde_json::to_value(request)?)
            .await?;
        Ok(())
    }

    /// Push a broadcast notification to all devices
    pub async fn broadcast_push(&self, request: &BroadcastPush) -> AdminResult<()> {
        self.client
            .post(
                "/notifications/push/broadcast",
                serde_json::to_value(request)?,
            )
            .await?;
        Ok(())
    }

    /// Unwrap the `{data: [...]}` envelope these endpoints respond with
    fn enveloped_items<T: serde::de::DeserializeOwned>(value: Value) -> AdminResult<Vec<T>> {
        let items = match value {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            Value::Array(items) => items,
            _ => Vec::new(),
        };

        items
            .into_iter()
            .map(|item| Ok(serde_json::from_value(item)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_request_omits_open_end() {
        let request = BanRequest {
            reason: "spam".to_string(),
            banned_until: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"reason": "spam"}));
    }

    #[test]
    fn test_report_review_wire_shape() {
        let review = ReportReview {
            status: ReportStatus::UnderReview,
            admin_note: Some("checking".to_string()),
        };
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "under-review", "adminNote": "checking"})
        );
    }

    #[test]
    fn test_broadcast_push_nests_type() {
        let push = BroadcastPush {
            title: "New concept".to_string(),
            message: "Today's concept is live".to_string(),
            data: PushData {
                kind: NotificationType::ConceptActivated,
            },
        };
        let value = serde_json::to_value(&push).unwrap();
        assert_eq!(value["data"]["type"], "concept_activated");
    }

    #[test]
    fn test_enveloped_items_tolerates_shapes() {
        let items: Vec<Value> =
            AdminApi::enveloped_items(serde_json::json!({"data": [{"a": 1}]})).unwrap();
        assert_eq!(items.len(), 1);

        let items: Vec<Value> = AdminApi::enveloped_items(serde_json::json!([{"a": 1}])).unwrap();
        assert_eq!(items.len(), 1);

        let items: Vec<Value> = AdminApi::enveloped_items(serde_json::json!({"ok": true})).unwrap();
        assert!(items.is_empty());
    }
}
