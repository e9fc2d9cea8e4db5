//! Generic resource data adapter
//!
//! Translates abstract list/get/create/update/delete operations into REST
//! calls through the HTTP client and normalizes the backend's response
//! shapes into a uniform result. The adapter adds no error handling of its
//! own; retry and refresh live entirely in the client.

use crate::http::{ApiClient, RequestOptions};
use matchdesk_core::AdminResult;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct Sorter {
    pub field: String,
    pub direction: SortDirection,
}

impl Sorter {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Contains,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: FilterOperator::Eq,
            value: value.into(),
        }
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: FilterOperator::Contains,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Parameters for a list operation
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub pagination: Pagination,
    pub sorters: Vec<Sorter>,
    pub filters: Vec<Filter>,
    /// Current navigation URL; a `currentPage`/`current` query parameter
    /// overrides the page when the pagination argument is still at its
    /// default
    pub sync_url: Option<Url>,
}

/// Parameters for a custom endpoint call
#[derive(Debug, Clone, Default)]
pub struct CustomParams {
    pub filters: Vec<Filter>,
    pub sorters: Vec<Sorter>,
    pub payload: Option<Value>,
    pub headers: HashMap<String, String>,
}

/// Uniform result of a list operation
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub items: Vec<Value>,
    pub total: u64,
}

/// Generic CRUD adapter over a shared API client
pub struct DataProvider {
    client: Arc<ApiClient>,
}

impl DataProvider {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List records of a resource with pagination, filtering, and sorting
    pub async fn list(&self, resource: &str, params: ListParams) -> AdminResult<ListResult> {
        let query = build_list_query(&params);
        let value = self.client.get(&format!("/{}", resource), query).await?;
        Ok(normalize_list(value))
    }

    /// Fetch a single record by id
    pub async fn get_one(&self, resource: &str, id: &str) -> AdminResult<Value> {
        self.client
            .get(&format!("/{}/{}", resource, id), Vec::new())
            .await
    }

    /// Create a record, returning the created representation
    pub async fn create(&self, resource: &str, body: Value) -> AdminResult<Value> {
        self.client.post(&format!("/{}", resource), body).await
    }

    /// Replace a record by id
    pub async fn update(&self, resource: &str, id: &str, body: Value) -> AdminResult<Value> {
        self.client
            .put(&format!("/{}/{}", resource, id), body)
            .await
    }

    /// Delete a record by id
    pub async fn delete_one(&self, resource: &str, id: &str) -> AdminResult<Value> {
        self.client
            .delete(&format!("/{}/{}", resource, id), None)
            .await
    }

    /// Call an arbitrary endpoint through the same client
    ///
    /// GET-like methods get filters and sorters serialized into the query
    /// string; mutating methods send the payload as the JSON body, DELETE
    /// included.
    pub async fn custom(
        &self,
        url: &str,
        method: Method,
        params: CustomParams,
    ) -> AdminResult<Value> {
        let mut options = RequestOptions::new();
        for (key, value) in &params.headers {
            options = options.with_header(key, value);
        }

        // DELETE included among the mutating methods: its payload travels
        // as the request body, not as query parameters
        let mutating = matches!(
            method.as_str(),
            "POST" | "PUT" | "PATCH" | "DELETE"
        );

        if mutating {
            if let Some(payload) = params.payload {
                options = options.with_body(payload);
            }
            self.client.send(method, url, options).await
        } else {
            let query = build_custom_query(&params.filters, &params.sorters);
            let request_url = if query.is_empty() {
                url.to_string()
            } else {
                format!("{}?{}", url, query)
            };
            self.client.send(method, &request_url, options).await
        }
    }
}

/// Build the query parameters for a list operation
///
/// Page and page-size come from the pagination argument (the navigation URL
/// wins while pagination is still at the default page), equality filters are
/// copied verbatim by field name, and at most the first sorter becomes a
/// single `sort` parameter, minus-prefixed for descending order.
fn build_list_query(params: &ListParams) -> Vec<(String, String)> {
    let mut page = params.pagination.page;

    if page == DEFAULT_PAGE {
        if let Some(url) = &params.sync_url {
            if let Some(override_page) = page_from_url(url) {
                page = override_page;
            }
        }
    }

    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), params.pagination.page_size.to_string()),
    ];

    for filter in &params.filters {
        if filter.operator == FilterOperator::Eq {
            query.push((filter.field.clone(), literal_value(&filter.value)));
        }
    }

    if let Some(sorter) = params.sorters.first() {
        query.push(("sort".to_string(), sort_value(sorter)));
    }

    query
}

/// Read a page override from the navigation URL
fn page_from_url(url: &Url) -> Option<u32> {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    ["currentPage", "current"]
        .iter()
        .find_map(|key| pairs.iter().find(|(k, _)| k == key))
        .and_then(|(_, v)| v.parse().ok())
}

/// Serialize the query string for a custom GET-like call
///
/// Unlike `list`, every filter is serialized as a raw `field=value` pair
/// regardless of operator.
fn build_custom_query(filters: &[Filter], sorters: &[Sorter]) -> String {
    let mut pairs: Vec<String> = filters
        .iter()
        .map(|filter| {
            format!(
                "{}={}",
                filter.field,
                urlencoding::encode(&literal_value(&filter.value))
            )
        })
        .collect();

    if let Some(sorter) = sorters.first() {
        pairs.push(format!("sort={}", urlencoding::encode(&sort_value(sorter))));
    }

    pairs.join("&")
}

fn sort_value(sorter: &Sorter) -> String {
    match sorter.direction {
        SortDirection::Asc => sorter.field.clone(),
        SortDirection::Desc => format!("-{}", sorter.field),
    }
}

/// Render a filter value the way it appears in a query string
fn literal_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize the two list response shapes into `{items, total}`
///
/// A bare array is the full item sequence with its length as total; an
/// object carries the items under `data` and optionally a `total` count.
fn normalize_list(value: Value) -> ListResult {
    match value {
        Value::Array(items) => ListResult {
            total: items.len() as u64,
            items,
        },
        Value::Object(mut map) => {
            let total_field = map.get("total").and_then(Value::as_u64);
            let items = match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let total = total_field.unwrap_or(items.len() as u64);
            ListResult { items, total }
        }
        _ => ListResult {
            items: Vec::new(),
            total: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_list_query_defaults() {
        let query = build_list_query(&ListParams::default());
        assert_eq!(param(&query, "page"), Some("1"));
        assert_eq!(param(&query, "limit"), Some("10"));
        assert_eq!(param(&query, "sort"), None);
    }

    #[test]
    fn test_sorter_serialization() {
        let mut params = ListParams::default();
        params.sorters = vec![Sorter::desc("date")];
        assert_eq!(param(&build_list_query(&params), "sort"), Some("-date"));

        params.sorters = vec![Sorter::asc("date")];
        assert_eq!(param(&build_list_query(&params), "sort"), Some("date"));
    }

    #[test]
    fn test_only_first_sorter_is_used() {
        let mut params = ListParams::default();
        params.sorters = vec![Sorter::desc("date"), Sorter::asc("email")];
        let query = build_list_query(&params);
        assert_eq!(param(&query, "sort"), Some("-date"));
        assert_eq!(query.iter().filter(|(k, _)| k == "sort").count(), 1);
    }

    #[test]
    fn test_eq_filters_copied_verbatim() {
        let mut params = ListParams::default();
        params.filters = vec![
            Filter::eq("isActive", true),
            Filter::eq("role", "user"),
            Filter::contains("email", "fox"),
        ];
        let query = build_list_query(&params);
        assert_eq!(param(&query, "isActive"), Some("true"));
        assert_eq!(param(&query, "role"), Some("user"));
        // non-eq operators are ignored by list
        assert_eq!(param(&query, "email"), None);
    }

    #[test]
    fn test_url_page_override_when_pagination_default() {
        let mut params = ListParams::default();
        params.sync_url = Some(Url::parse("http://localhost/users?currentPage=4").unwrap());
        assert_eq!(param(&build_list_query(&params), "page"), Some("4"));

        params.sync_url = Some(Url::parse("http://localhost/users?current=7").unwrap());
        assert_eq!(param(&build_list_query(&params), "page"), Some("7"));
    }

    #[test]
    fn test_url_override_ignored_for_explicit_page() {
        let mut params = ListParams::default();
        params.pagination.page = 3;
        params.sync_url = Some(Url::parse("http://localhost/users?currentPage=4").unwrap());
        assert_eq!(param(&build_list_query(&params), "page"), Some("3"));
    }

    #[test]
    fn test_current_page_wins_over_current() {
        let mut params = ListParams::default();
        params.sync_url =
            Some(Url::parse("http://localhost/users?current=2&currentPage=5").unwrap());
        assert_eq!(param(&build_list_query(&params), "page"), Some("5"));
    }

    #[test]
    fn test_normalize_bare_array() {
        let result = normalize_list(json!([{"a": 1}, {"a": 2}]));
        assert_eq!(result.total, 2);
        assert_eq!(result.items, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn test_normalize_data_with_total() {
        let result = normalize_list(json!({"data": [{"a": 1}], "total": 5}));
        assert_eq!(result.total, 5);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_normalize_data_without_total() {
        let result = normalize_list(json!({"data": [{"a": 1}]}));
        assert_eq!(result.total, 1);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_normalize_object_without_data() {
        let result = normalize_list(json!({"message": "ok"}));
        assert_eq!(result.total, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_custom_query_serializes_all_filters() {
        let filters = vec![
            Filter::eq("status", "pending"),
            Filter::contains("note", "spam ham"),
        ];
        let sorters = vec![Sorter::desc("reportDate")];
        let query = build_custom_query(&filters, &sorters);
        assert_eq!(query, "status=pending&note=spam%20ham&sort=-reportDate");
    }

    #[test]
    fn test_custom_query_empty() {
        assert_eq!(build_custom_query(&[], &[]), "");
    }
}
