use crate::models::{Month, MonthSnapshot, MonthStatus, Participant, ParticipantRole, ParticipantStatus};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Participant documents requested per page
const PARTICIPANT_PAGE_SIZE: usize = 100;

/// Longest custom document ID Appwrite accepts
const MAX_DOCUMENT_ID_LEN: usize = 36;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Read-only Appwrite client for the dinner sign-up collections
///
/// Loads a month document and the confirmed sign-ups for it. Writing the
/// resulting matches back is left to the caller.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
    page_size: usize,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub months: String,
    pub participants: String,
}

#[derive(Debug, Deserialize)]
struct MonthDocument {
    #[serde(rename = "$id")]
    id: String,
    status: MonthStatus,
    #[serde(rename = "eventDate", default)]
    event_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    label: Option<String>,
}

impl From<MonthDocument> for Month {
    fn from(doc: MonthDocument) -> Self {
        Month {
            id: doc.id,
            status: doc.status,
            event_date: doc.event_date,
            label: doc.label,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParticipantDocument {
    #[serde(rename = "$id")]
    document_id: String,
    #[serde(rename = "userId")]
    user_id: String,
    role: ParticipantRole,
    #[serde(rename = "hasPlusOne", default)]
    has_plus_one: bool,
    #[serde(rename = "maxGuestUnits", default)]
    max_guest_units: Option<i32>,
    #[serde(default)]
    status: ParticipantStatus,
}

impl From<ParticipantDocument> for Participant {
    fn from(doc: ParticipantDocument) -> Self {
        Participant {
            id: doc.user_id,
            role: doc.role,
            has_plus_one: doc.has_plus_one,
            max_guest_units: doc.max_guest_units,
            status: doc.status,
        }
    }
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout: Duration,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
            page_size: PARTICIPANT_PAGE_SIZE,
        })
    }

    /// Override how many sign-ups are requested per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, AppwriteError> {
        let response = self
            .client
            .get(url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(AppwriteError::NotFound(url.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppwriteError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Appwrite request failed: {} - {}", status, body);
                Err(AppwriteError::ApiError(format!("Request failed: {}", status)))
            }
        }
    }

    /// Fetch one month document by ID
    pub async fn get_month(&self, month_id: &str) -> Result<Month, AppwriteError> {
        check_document_id(month_id)?;

        let url = format!(
            "{}/{}",
            self.documents_url(&self.collections.months),
            urlencoding::encode(month_id)
        );

        tracing::debug!("Fetching month {}", month_id);

        let json = match self.get_json(&url).await {
            Err(AppwriteError::NotFound(_)) => {
                return Err(AppwriteError::NotFound(format!("Month {} not found", month_id)))
            }
            other => other?,
        };

        let doc: MonthDocument = serde_json::from_value(json)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse month: {}", e)))?;

        Ok(doc.into())
    }

    fn participants_page_url(&self, month_id: &str, cursor: Option<&str>) -> String {
        let mut queries = vec![
            format!("equal(\"monthId\", [\"{}\"])", month_id),
            "equal(\"status\", [\"confirmed\"])".to_string(),
            format!("limit({})", self.page_size),
        ];
        if let Some(cursor) = cursor {
            queries.push(format!("cursorAfter(\"{}\")", cursor));
        }

        let query_string = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}?{}",
            self.documents_url(&self.collections.participants),
            query_string
        )
    }

    /// Fetch the confirmed sign-ups of a month
    ///
    /// Follows `cursorAfter` pages until `total` documents are loaded or a
    /// short page comes back. Any malformed document fails the whole load.
    pub async fn list_confirmed_participants(
        &self,
        month_id: &str,
    ) -> Result<Vec<Participant>, AppwriteError> {
        check_document_id(month_id)?;

        let mut participants: Vec<Participant> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = self.participants_page_url(month_id, cursor.as_deref());
            let json = self.get_json(&url).await?;

            let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

            let documents = json
                .get("documents")
                .and_then(|d| d.as_array())
                .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

            for doc in documents {
                let parsed = ParticipantDocument::deserialize(doc).map_err(|e| {
                    AppwriteError::InvalidResponse(format!(
                        "Malformed sign-up in month {}: {}",
                        month_id, e
                    ))
                })?;
                check_document_id(&parsed.document_id).map_err(|_| {
                    AppwriteError::InvalidResponse(format!(
                        "Sign-up in month {} has an unusable document ID",
                        month_id
                    ))
                })?;
                cursor = Some(parsed.document_id.clone());
                participants.push(parsed.into());
            }

            tracing::debug!(
                "Loaded page of {} sign-up(s) for month {} ({}/{})",
                documents.len(),
                month_id,
                participants.len(),
                total
            );

            if documents.len() < self.page_size || participants.len() as u64 >= total {
                break;
            }
        }

        tracing::debug!("Loaded {} participants for month {}", participants.len(), month_id);

        Ok(participants)
    }

    /// Build the engine snapshot for a month.
    ///
    /// A missing month yields a snapshot without `month` so the engine reports it.
    pub async fn fetch_snapshot(&self, month_id: &str) -> Result<MonthSnapshot, AppwriteError> {
        let month = match self.get_month(month_id).await {
            Ok(month) => month,
            Err(AppwriteError::NotFound(_)) => {
                return Ok(MonthSnapshot {
                    month_id: month_id.to_string(),
                    month: None,
                    participants: vec![],
                })
            }
            Err(e) => return Err(e),
        };

        let participants = self.list_confirmed_participants(month_id).await?;

        Ok(MonthSnapshot {
            month_id: month_id.to_string(),
            month: Some(month),
            participants,
        })
    }
}

/// Reject IDs that could break out of a query string literal.
///
/// Appwrite custom IDs are limited to `a-z A-Z 0-9 . - _` and 36 characters.
fn check_document_id(id: &str) -> Result<(), AppwriteError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_DOCUMENT_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(AppwriteError::InvalidInput(format!("Invalid document ID: {:?}", id)))
    }
}
