//! Stored outcome of an idempotent command.

use chrono::{DateTime, Utc};
use common::IdempotencyRecordId;

/// Links a client-supplied idempotency key to the request it arrived with and
/// the response that was returned for it.
///
/// A record starts with an empty response and no status code. The response is
/// attached once, after the command has completed, and the record is never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    id: IdempotencyRecordId,
    key: String,
    request: String,
    response: String,
    status_code: Option<u16>,
    created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    /// Creates a record for `key` holding the serialized request.
    pub fn new(key: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            id: IdempotencyRecordId::new(),
            key: key.into(),
            request: request.into(),
            response: String::new(),
            status_code: None,
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a record from stored fields.
    pub fn from_parts(
        id: IdempotencyRecordId,
        key: impl Into<String>,
        request: impl Into<String>,
        response: impl Into<String>,
        status_code: Option<u16>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            request: request.into(),
            response: response.into(),
            status_code,
            created_at,
        }
    }

    /// Attaches the serialized response and its status code.
    pub fn set_response(&mut self, response: impl Into<String>, status_code: u16) {
        self.response = response.into();
        self.status_code = Some(status_code);
    }

    /// Returns true once a response has been attached.
    pub fn has_response(&self) -> bool {
        self.status_code.is_some() && !self.response.is_empty()
    }

    pub fn id(&self) -> IdempotencyRecordId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
