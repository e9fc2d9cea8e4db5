//! Matchdesk Client - authenticated REST client for the admin backend
//!
//! Provides the credential store, the HTTP client with transparent token
//! refresh, the auth session manager, the generic resource data adapter,
//! and typed wrappers for the admin-only endpoints.

pub mod admin;
pub mod auth;
pub mod http;
pub mod provider;
pub mod session;

pub use admin::{AdminApi, BanRequest, BroadcastPush, PushData, ReportReview, SendNotification};
pub use auth::{AuthManager, CheckStatus, ErrorAction, LOGIN_REJECTION_MESSAGE};
pub use http::{ApiClient, RequestOptions};
pub use provider::{
    CustomParams, DataProvider, Filter, FilterOperator, ListParams, ListResult, Pagination,
    SortDirection, Sorter,
};
pub use session::{
    CredentialStorage, FileCredentialStorage, MemoryCredentialStorage, SessionStore,
};
