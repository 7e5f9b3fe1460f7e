use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, SimpleObject, ID};
use chrono::{DateTime, SecondsFormat, Utc};
use tracker_shared::models::{Event, GpsRecord, RestrictedLocation};

use crate::storage::Storage;

// GraphQL output types

#[derive(SimpleObject)]
#[graphql(name = "GpsRecord")]
pub struct GqlGpsRecord {
    pub id: ID,
    pub latitude: f64,
    pub longitude: f64,
    pub gathered_at: String,
}

impl From<GpsRecord> for GqlGpsRecord {
    fn from(r: GpsRecord) -> Self {
        GqlGpsRecord {
            id: ID(r.id),
            latitude: r.latitude,
            longitude: r.longitude,
            gathered_at: format_timestamp(r.gathered_at),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Event")]
pub struct GqlEvent {
    pub id: ID,
    pub kind: String,
    pub occurred_at: String,
    pub gps_record_id: Option<ID>,
    pub description: Option<String>,
}

impl From<Event> for GqlEvent {
    fn from(e: Event) -> Self {
        GqlEvent {
            id: ID(e.id),
            kind: e.kind,
            occurred_at: format_timestamp(e.occurred_at),
            gps_record_id: e.gps_record_id.map(ID),
            description: e.description,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "RestrictedLocation")]
pub struct GqlRestrictedLocation {
    pub id: ID,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub restriction_name: String,
}

impl From<RestrictedLocation> for GqlRestrictedLocation {
    fn from(l: RestrictedLocation) -> Self {
        GqlRestrictedLocation {
            id: ID(l.id),
            name: l.name,
            address: l.address,
            latitude: l.latitude,
            longitude: l.longitude,
            restriction_name: l.restriction_name,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "GpsRecordPage")]
pub struct GqlGpsRecordPage {
    pub rows: Vec<GqlGpsRecord>,
}

#[derive(SimpleObject)]
#[graphql(name = "EventPage")]
pub struct GqlEventPage {
    pub rows: Vec<GqlEvent>,
}

#[derive(SimpleObject)]
#[graphql(name = "RestrictedLocationPage")]
pub struct GqlRestrictedLocationPage {
    pub rows: Vec<GqlRestrictedLocation>,
}

// Input types

#[derive(InputObject)]
pub struct GpsRecordInput {
    pub user_id: ID,
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339; defaults to now.
    pub gathered_at: Option<String>,
}

#[derive(InputObject)]
pub struct EventInput {
    pub user_id: ID,
    pub kind: String,
    /// RFC 3339; defaults to now.
    pub occurred_at: Option<String>,
    pub gps_record_id: Option<ID>,
    pub description: Option<String>,
}

#[derive(InputObject)]
pub struct RestrictedLocationInput {
    pub user_id: ID,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub restriction_name: String,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(field: &str, value: &str) -> async_graphql::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| async_graphql::Error::new(format!("Invalid {}: {}", field, e)))
}

fn parse_window(from: &str, to: &str) -> async_graphql::Result<(DateTime<Utc>, DateTime<Utc>)> {
    Ok((
        parse_timestamp("createdAtFrom", from)?,
        parse_timestamp("createdAtTo", to)?,
    ))
}

fn timestamp_or_now(field: &str, value: Option<&str>) -> async_graphql::Result<DateTime<Utc>> {
    match value {
        Some(v) => parse_timestamp(field, v),
        None => Ok(Utc::now()),
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn gps_records(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        created_at_from: String,
        created_at_to: String,
    ) -> async_graphql::Result<GqlGpsRecordPage> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let (from, to) = parse_window(&created_at_from, &created_at_to)?;
        let rows = storage
            .gps_records(&user_id, from, to)
            .map_err(async_graphql::Error::new)?;
        tracing::debug!(user_id = %user_id.as_str(), rows = rows.len(), "gps_records");
        Ok(GqlGpsRecordPage {
            rows: rows.into_iter().map(GqlGpsRecord::from).collect(),
        })
    }

    async fn events(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        created_at_from: String,
        created_at_to: String,
    ) -> async_graphql::Result<GqlEventPage> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let (from, to) = parse_window(&created_at_from, &created_at_to)?;
        let rows = storage
            .events(&user_id, from, to)
            .map_err(async_graphql::Error::new)?;
        tracing::debug!(user_id = %user_id.as_str(), rows = rows.len(), "events");
        Ok(GqlEventPage {
            rows: rows.into_iter().map(GqlEvent::from).collect(),
        })
    }

    async fn restricted_locations(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
    ) -> async_graphql::Result<GqlRestrictedLocationPage> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let rows = storage
            .restricted_locations(&user_id)
            .map_err(async_graphql::Error::new)?;
        Ok(GqlRestrictedLocationPage {
            rows: rows.into_iter().map(GqlRestrictedLocation::from).collect(),
        })
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn record_gps(
        &self,
        ctx: &Context<'_>,
        input: GpsRecordInput,
    ) -> async_graphql::Result<GqlGpsRecord> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let record = GpsRecord {
            id: uuid::Uuid::new_v4().to_string(),
            latitude: input.latitude,
            longitude: input.longitude,
            gathered_at: timestamp_or_now("gatheredAt", input.gathered_at.as_deref())?,
        };
        storage
            .save_gps_record(&input.user_id, &record)
            .map_err(async_graphql::Error::new)?;
        Ok(GqlGpsRecord::from(record))
    }

    async fn record_event(
        &self,
        ctx: &Context<'_>,
        input: EventInput,
    ) -> async_graphql::Result<GqlEvent> {
        let storage = ctx.data::<Arc<Storage>>()?;
        if input.kind.trim().is_empty() {
            return Err(async_graphql::Error::new("Event kind must not be empty"));
        }
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            kind: input.kind,
            occurred_at: timestamp_or_now("occurredAt", input.occurred_at.as_deref())?,
            gps_record_id: input.gps_record_id.map(|id| id.0),
            description: input.description,
        };
        storage
            .save_event(&input.user_id, &event)
            .map_err(async_graphql::Error::new)?;
        Ok(GqlEvent::from(event))
    }

    async fn add_restricted_location(
        &self,
        ctx: &Context<'_>,
        input: RestrictedLocationInput,
    ) -> async_graphql::Result<GqlRestrictedLocation> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let location = RestrictedLocation {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            address: input.address,
            latitude: input.latitude,
            longitude: input.longitude,
            restriction_name: input.restriction_name,
        };
        storage
            .save_restricted_location(&input.user_id, &location)
            .map_err(async_graphql::Error::new)?;
        Ok(GqlRestrictedLocation::from(location))
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(storage: Arc<Storage>) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(storage)
        .finish()
}
