use serde::{Deserialize, Serialize};
use tracker_shared::models::{Event, GpsRecord, RestrictedLocation};
use tracker_shared::range::DateRange;

/// Build the variables JSON shared by the date-windowed queries.
pub fn build_window_variables(user_id: &str, range: &DateRange) -> serde_json::Value {
    let (from, to) = range.query_window();
    serde_json::json!({
        "userId": user_id,
        "createdAtFrom": from,
        "createdAtTo": to,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn api_url() -> Result<String, String> {
    let origin = web_sys::window()
        .ok_or_else(|| "No window".to_string())?
        .location()
        .origin()
        .map_err(|_| "No location origin".to_string())?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    into_data(gql_resp)
}

/// First GraphQL error wins; otherwise the data must be present.
fn into_data<T>(resp: GraphQLResponse<T>) -> Result<T, String> {
    if let Some(errors) = resp.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.message);
        }
    }
    resp.data.ok_or_else(|| "No data returned".to_string())
}

/// `{ rows: [...] }` wrapper every list query returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
}

// API functions

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsRecordsResponse {
    pub gps_records: Page<GpsRecord>,
}

pub async fn fetch_gps_records(user_id: &str, range: &DateRange) -> Result<Vec<GpsRecord>, String> {
    let resp: GpsRecordsResponse = query(
        r#"query GpsRecords($userId: ID!, $createdAtFrom: String!, $createdAtTo: String!) {
            gpsRecords(userId: $userId, createdAtFrom: $createdAtFrom, createdAtTo: $createdAtTo) {
                rows { id latitude longitude gatheredAt }
            }
        }"#,
        Some(build_window_variables(user_id, range)),
    )
    .await?;
    Ok(resp.gps_records.rows)
}

#[derive(Deserialize)]
pub struct EventsResponse {
    pub events: Page<Event>,
}

pub async fn fetch_events(user_id: &str, range: &DateRange) -> Result<Vec<Event>, String> {
    let resp: EventsResponse = query(
        r#"query Events($userId: ID!, $createdAtFrom: String!, $createdAtTo: String!) {
            events(userId: $userId, createdAtFrom: $createdAtFrom, createdAtTo: $createdAtTo) {
                rows { id kind occurredAt gpsRecordId description }
            }
        }"#,
        Some(build_window_variables(user_id, range)),
    )
    .await?;
    Ok(resp.events.rows)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedLocationsResponse {
    pub restricted_locations: Page<RestrictedLocation>,
}

pub async fn fetch_restricted_locations(user_id: &str) -> Result<Vec<RestrictedLocation>, String> {
    let variables = serde_json::json!({ "userId": user_id });
    let resp: RestrictedLocationsResponse = query(
        r#"query RestrictedLocations($userId: ID!) {
            restrictedLocations(userId: $userId) {
                rows { id name address latitude longitude restrictionName }
            }
        }"#,
        Some(variables),
    )
    .await?;
    Ok(resp.restricted_locations.rows)
}
