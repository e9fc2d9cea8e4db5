//! Core data type definitions
//!
//! Wire-format types for the admin backend. The backend speaks camelCase
//! JSON with Mongo-style `_id` identifiers; every struct here mirrors that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account roles known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "super_admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "user" => Ok(Role::User),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Normalized identity of the operator holding the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    /// Display name, preferring the account's random name over its email
    pub name: String,
    pub email: String,
    /// Derived avatar image URL
    pub avatar: String,
    pub role: Role,
}

/// The single active credential set for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub identity: Identity,
}

/// Reference to a user's active notification binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRef {
    pub id: String,
    pub is_active: bool,
}

/// A managed end-user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub random_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub total_matches: u32,
    pub active_matches: Option<u32>,
    pub total_photos: Option<u32>,
    pub completed_photos: Option<u32>,
    pub recent_matched_users: Vec<String>,
    pub notification: Option<NotificationRef>,
    pub timezone: Option<String>,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub banned_until: Option<DateTime<Utc>>,
    pub banned_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A daily pairing between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: DateTime<Utc>,
    pub user1_id: User,
    pub user2_id: User,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub user1_photos_count: u32,
    pub user2_photos_count: u32,
    pub did_user1_see_partner: bool,
    pub did_user2_see_partner: bool,
    pub is_broken_by_report: bool,
    pub report_id: Option<String>,
    pub user1_photos: Option<Photo>,
    pub user2_photos: Option<Photo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reactions a partner can leave on a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Love,
    Fire,
    Cool,
    Funny,
    Wow,
    Meh,
}

/// Daily time window slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeType {
    Morning,
    Afternoon,
    Evening,
    Night,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub reacted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTimePhoto {
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    pub daily_time_id: String,
    pub time_type: TimeType,
    pub is_it_seen_by_partner: bool,
    pub reaction: Option<Reaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptPhoto {
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    pub concept_id: String,
    pub is_it_seen_by_partner: bool,
    pub reaction: Option<Reaction>,
}

/// One user's photo set for a match day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub concept_photo: Option<ConceptPhoto>,
    pub daily_times_photos: Vec<DailyTimePhoto>,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo concept scheduled for a given day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub concept: String,
    pub description: String,
    pub image_url: Option<String>,
    pub activate_date_time: DateTime<Utc>,
    pub upload_window_minutes: u32,
    pub is_active: bool,
    pub notification_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configured daily time window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTime {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimeType,
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportCategory {
    ChildSafety,
    Inappropriate,
    Spam,
    Harassment,
    Fake,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

/// A user-filed report against another user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    pub reporter_id: User,
    pub reported_user_id: User,
    pub report_date: DateTime<Utc>,
    pub match_id: String,
    pub category: ReportCategory,
    pub custom_text: Option<String>,
    pub status: ReportStatus,
    pub reviewed_by: Option<User>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_note: Option<String>,
    pub did_break_match: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    PartnerNudge,
    AdminNotification,
    System,
    PhotoReaction,
    ConceptActivated,
}

/// A notification delivered to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    pub recipient_id: String,
    pub sender_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub date: Option<DateTime<Utc>>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A versioned policy document shown to end users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub content: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user reference embedded in dashboard activity feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    #[serde(rename = "_id")]
    pub id: String,
    pub random_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub banned: u64,
    pub new_this_week: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub total: u64,
    pub active: u64,
    pub completed_today: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total: u64,
    pub pending: u64,
    pub under_review: u64,
    pub resolved_this_week: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub users: UserStats,
    pub matches: MatchStats,
    pub reports: ReportStats,
}

/// Recently created user as it appears in the dashboard feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub random_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_banned: bool,
}

/// Recently created match as it appears in the dashboard feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: DateTime<Utc>,
    pub user1: UserBrief,
    pub user2: UserBrief,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Recently filed report as it appears in the dashboard feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub reporter: UserBrief,
    pub reported_user: UserBrief,
    pub category: ReportCategory,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivities {
    pub latest_users: Vec<UserSummary>,
    pub latest_matches: Vec<MatchSummary>,
    pub latest_reports: Vec<ReportSummary>,
}

/// Everything the dashboard landing page renders in one payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub statistics: DashboardStatistics,
    pub recent_activities: RecentActivities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"user\"").unwrap(),
            Role::User
        );
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_report_enums_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReportCategory::ChildSafety).unwrap(),
            "\"child-safety\""
        );
        assert_eq!(
            serde_json::to_string(&ReportStatus::UnderReview).unwrap(),
            "\"under-review\""
        );
        assert_eq!(
            serde_json::from_str::<NotificationType>("\"partner_nudge\"").unwrap(),
            NotificationType::PartnerNudge
        );
    }

    #[test]
    fn test_user_deserializes_backend_shape() {
        let raw = serde_json::json!({
            "_id": "u1",
            "randomName": "BlueFox",
            "email": "fox@example.com",
            "role": "user",
            "isActive": true,
            "totalMatches": 12,
            "recentMatchedUsers": ["u2", "u3"],
            "isBanned": false,
            "createdAt": "2025-06-01T10:00:00Z",
            "updatedAt": "2025-06-02T10:00:00Z"
        });

        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.random_name, "BlueFox");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.active_matches, None);
        assert_eq!(user.recent_matched_users.len(), 2);
    }

    #[test]
    fn test_daily_time_kind_field() {
        let raw = serde_json::json!({
            "_id": "dt1",
            "type": "morning",
            "startHour": 8,
            "startMinute": 30,
            "endHour": 9,
            "endMinute": 0,
            "createdAt": "2025-06-01T10:00:00Z",
            "updatedAt": "2025-06-01T10:00:00Z"
        });

        let slot: DailyTime = serde_json::from_value(raw).unwrap();
        assert_eq!(slot.kind, TimeType::Morning);
        assert_eq!(slot.start_hour, 8);
    }
}
