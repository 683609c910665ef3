//! Long-running operations
//!
//! ARM answers slow writes with `201`/`202` and a URL to poll. The handle
//! built here records where to poll; [`LongRunningOperation::wait`] polls
//! until the operation reaches a terminal status. There is no timeout: the
//! call returns once the server reports the operation as finished.

use super::client::AzureClient;
use super::http::{ApiError, ArmResponse};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
const LOCATION_HEADER: &str = "location";

/// Where the status of a pending operation is reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// `Azure-AsyncOperation`: body carries `status`
    AsyncOperation(String),
    /// `Location`: 202 while running, 200/201/204 when finished
    Location(String),
}

/// Handle returned by a create-or-update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRunningOperation {
    poll: Option<PollTarget>,
    retry_after: Option<Duration>,
}

/// Terminal state of an `Azure-AsyncOperation` status body
#[derive(Debug, Clone, PartialEq, Eq)]
enum OperationStatus {
    InProgress,
    Succeeded,
    Failed(String, String),
}

impl LongRunningOperation {
    /// An operation that finished with the initial response
    pub fn completed() -> Self {
        Self {
            poll: None,
            retry_after: None,
        }
    }

    /// An operation still running server-side
    pub fn pending(poll: PollTarget, retry_after: Option<Duration>) -> Self {
        Self {
            poll: Some(poll),
            retry_after,
        }
    }

    /// Build the handle from the initial PUT/DELETE response
    pub fn from_response(response: &ArmResponse) -> Result<Self, ApiError> {
        let retry_after = response.retry_after();

        if let Some(url) = response.header(ASYNC_OPERATION_HEADER) {
            return Ok(Self::pending(
                PollTarget::AsyncOperation(url.to_string()),
                retry_after,
            ));
        }

        if response.status == StatusCode::ACCEPTED {
            return match response.header(LOCATION_HEADER) {
                Some(url) => Ok(Self::pending(PollTarget::Location(url.to_string()), retry_after)),
                None => Err(ApiError::MissingPollUrl),
            };
        }

        Ok(Self::completed())
    }

    pub fn is_done(&self) -> bool {
        self.poll.is_none()
    }

    pub fn poll_target(&self) -> Option<&PollTarget> {
        self.poll.as_ref()
    }

    /// Block until the operation reaches a terminal status
    pub async fn wait(&self, client: &AzureClient) -> Result<(), ApiError> {
        let Some(target) = &self.poll else {
            return Ok(());
        };

        let mut delay = self.retry_after.unwrap_or(client.poll_interval);
        let mut polls: u32 = 0;

        loop {
            tokio::time::sleep(delay).await;
            polls += 1;

            let (url, finished) = match target {
                PollTarget::AsyncOperation(url) => {
                    let response = client.get(url).await?;
                    delay = response.retry_after().unwrap_or(client.poll_interval);
                    match parse_status(&response.body) {
                        OperationStatus::Succeeded => (url, true),
                        OperationStatus::Failed(status, message) => {
                            tracing::warn!("Operation {} finished as {}", url, status);
                            return Err(ApiError::OperationFailed { status, message });
                        }
                        OperationStatus::InProgress => (url, false),
                    }
                }
                PollTarget::Location(url) => {
                    let response = client.get(url).await?;
                    delay = response.retry_after().unwrap_or(client.poll_interval);
                    (url, response.status != StatusCode::ACCEPTED)
                }
            };

            if finished {
                tracing::debug!("Operation {} completed after {} polls", url, polls);
                return Ok(());
            }

            tracing::debug!("Operation {} still running, next poll in {:?}", url, delay);
        }
    }
}

fn parse_status(body: &Value) -> OperationStatus {
    let status = body.get("status").and_then(|v| v.as_str()).unwrap_or("InProgress");

    match status {
        s if s.eq_ignore_ascii_case("Succeeded") => OperationStatus::Succeeded,
        s if s.eq_ignore_ascii_case("Failed")
            || s.eq_ignore_ascii_case("Canceled")
            || s.eq_ignore_ascii_case("Cancelled") =>
        {
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string();
            OperationStatus::Failed(s.to_string(), message)
        }
        _ => OperationStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;

    fn response(status: StatusCode, headers: &[(&'static str, &'static str)]) -> ArmResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        ArmResponse {
            status,
            headers: map,
            body: Value::Null,
        }
    }

    #[test]
    fn test_ok_without_headers_is_completed() {
        let op = LongRunningOperation::from_response(&response(StatusCode::OK, &[])).unwrap();
        assert!(op.is_done());
    }

    #[test]
    fn test_async_operation_header_wins_over_location() {
        let op = LongRunningOperation::from_response(&response(
            StatusCode::CREATED,
            &[
                ("azure-asyncoperation", "https://poll/async"),
                ("location", "https://poll/location"),
                ("retry-after", "3"),
            ],
        ))
        .unwrap();

        assert_eq!(
            op,
            LongRunningOperation::pending(
                PollTarget::AsyncOperation("https://poll/async".into()),
                Some(Duration::from_secs(3))
            )
        );
    }

    #[test]
    fn test_accepted_with_location() {
        let op = LongRunningOperation::from_response(&response(
            StatusCode::ACCEPTED,
            &[("location", "https://poll/location")],
        ))
        .unwrap();
        assert_eq!(
            op.poll_target(),
            Some(&PollTarget::Location("https://poll/location".into()))
        );
    }

    #[test]
    fn test_accepted_without_poll_url_is_an_error() {
        let err = LongRunningOperation::from_response(&response(StatusCode::ACCEPTED, &[]))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingPollUrl));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(&json!({"status": "Succeeded"})), OperationStatus::Succeeded);
        assert_eq!(parse_status(&json!({"status": "InProgress"})), OperationStatus::InProgress);
        assert_eq!(parse_status(&Value::Null), OperationStatus::InProgress);
        assert_eq!(
            parse_status(&json!({"status": "Failed", "error": {"message": "quota"}})),
            OperationStatus::Failed("Failed".into(), "quota".into())
        );
        assert!(matches!(
            parse_status(&json!({"status": "Canceled"})),
            OperationStatus::Failed(_, _)
        ));
    }
}
