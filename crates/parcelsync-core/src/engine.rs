//! Page-walking extraction engine.
//!
//! Drives repeated requests against one resource endpoint, strictly
//! sequentially: page N+1 is never requested before page N's response is
//! classified, because both the next page token and the termination
//! condition depend on it. Retry delays block the in-flight request only;
//! they never restart the overall extraction.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::classify::{Disposition, RetryPolicy};
use crate::config::ConnectorConfig;
use crate::context::ExtractionContext;
use crate::domain::{Tracking, UtcDateTime};
use crate::error::ExtractError;
use crate::http::{HttpAuth, HttpClient, HttpRequest};
use crate::pacing::RequestPacer;
use crate::sink::RecordSink;
use crate::stream::StreamDescriptor;
use crate::window::ReplicationWindow;

/// Outcome of a completed extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages requested, the final empty one included.
    pub pages: u32,
    pub records: u64,
    /// Highest replication value observed; `None` when no records carried one.
    pub bookmark: Option<UtcDateTime>,
}

/// Sequential page walker for one resource.
pub struct PageWalker {
    config: ConnectorConfig,
    descriptor: StreamDescriptor,
    http: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    pacer: RequestPacer,
    window: ReplicationWindow,
    context: ExtractionContext,
}

impl PageWalker {
    /// Walker for the trackings stream with default policy and pacing.
    ///
    /// `starting_bookmark` is the replication value persisted by a previous
    /// run, exactly as stored; `None` on a first run.
    pub fn new(
        config: ConnectorConfig,
        http: Arc<dyn HttpClient>,
        starting_bookmark: Option<String>,
    ) -> Self {
        let descriptor = StreamDescriptor::trackings();
        Self {
            config,
            descriptor,
            http,
            policy: RetryPolicy::default(),
            pacer: RequestPacer::default(),
            window: ReplicationWindow::new(descriptor.page_size),
            context: ExtractionContext::new(starting_bookmark),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn context(&self) -> &ExtractionContext {
        &self.context
    }

    /// Extracts every record in the replication window, emitting each to the
    /// sink in the order the API returned it (the API does not guarantee
    /// oldest-updated-first).
    ///
    /// After each completed page the sink is told the current bookmark, so a
    /// restart after a mid-run failure resumes from the last successful page
    /// instead of re-extracting from the beginning.
    pub async fn run(&mut self, sink: &mut dyn RecordSink) -> Result<RunSummary, ExtractError> {
        debug!(
            run_id = %self.context.run_id(),
            stream = self.descriptor.name,
            bookmark = self.context.starting_bookmark().unwrap_or("<none>"),
            "starting extraction run"
        );

        let mut page: u32 = 1;
        loop {
            let envelope = self.fetch_page(page).await?;
            self.context.page_fetched();

            let records = self.descriptor.project_records(&envelope);
            if records.is_empty() {
                // The sole stop condition; there is no total-page-count field.
                break;
            }

            for value in records {
                let record: Tracking =
                    serde_json::from_value(value).map_err(|error| ExtractError::Envelope {
                        path: self.descriptor.path.to_owned(),
                        message: format!("record does not match the trackings schema: {error}"),
                    })?;

                match record.replication_value() {
                    Some(updated_at) => self.context.observe(updated_at),
                    None => warn!(
                        run_id = %self.context.run_id(),
                        id = record.id.as_str(),
                        "record carries no replication value; bookmark unchanged"
                    ),
                }

                sink.emit(self.descriptor.name, &record)?;
                self.context.record_emitted();
            }

            if let Some(bookmark) = self.context.bookmark() {
                sink.bookmark(self.descriptor.name, bookmark)?;
            }

            page += 1;
        }

        let summary = RunSummary {
            pages: self.context.pages_fetched(),
            records: self.context.records_emitted(),
            bookmark: self.context.bookmark(),
        };
        info!(
            run_id = %self.context.run_id(),
            stream = self.descriptor.name,
            pages = summary.pages,
            records = summary.records,
            "extraction run complete"
        );
        Ok(summary)
    }

    /// Fetches one page, retrying per the policy.
    ///
    /// The request is built once per page — the window bounds are pinned at
    /// first issue — so every retry re-issues identical query parameters.
    /// Per request the states are pending → accepted, retry-pending (loop,
    /// bounded by the attempt ceiling), or fatal.
    async fn fetch_page(&self, page: u32) -> Result<Value, ExtractError> {
        let path = self.descriptor.path;
        let bounds = self.window.bounds(
            &self.config,
            self.context.starting_bookmark(),
            UtcDateTime::now(),
        )?;
        let request = HttpRequest::get(self.config.endpoint_url(path))
            .with_query_pairs(bounds.query_pairs())
            .with_query("page", page.to_string())
            .with_auth(&HttpAuth::api_key(self.config.api_key()));

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            if let Err(wait) = self.pacer.acquire() {
                debug!(
                    run_id = %self.context.run_id(),
                    wait_ms = wait.as_millis() as u64,
                    "request budget exhausted; pacing"
                );
                sleep(wait).await;
            }

            debug!(
                run_id = %self.context.run_id(),
                stream = self.descriptor.name,
                page,
                attempt,
                "requesting page"
            );

            let (after, last) = match self.http.execute(request.clone()).await {
                Ok(response) => match self.policy.classify(&response, attempt) {
                    Disposition::Accept => {
                        return serde_json::from_str(&response.body).map_err(|error| {
                            ExtractError::Envelope {
                                path: path.to_owned(),
                                message: error.to_string(),
                            }
                        });
                    }
                    Disposition::Fatal { .. } => {
                        return Err(ExtractError::Fatal {
                            status: response.status,
                            reason: response.reason,
                            path: path.to_owned(),
                        });
                    }
                    Disposition::Retry { after } => {
                        (after, format!("{} {}", response.status, response.reason))
                    }
                },
                Err(error) => match self.policy.classify_transport(&error, attempt) {
                    Disposition::Retry { after } => (after, error.message().to_owned()),
                    Disposition::Accept | Disposition::Fatal { .. } => {
                        return Err(ExtractError::Transport {
                            path: path.to_owned(),
                            message: error.message().to_owned(),
                        });
                    }
                },
            };

            if !self.policy.attempts_remaining(attempt) {
                return Err(ExtractError::RetriesExhausted {
                    attempts: attempt,
                    path: path.to_owned(),
                    last,
                });
            }

            warn!(
                run_id = %self.context.run_id(),
                page,
                attempt,
                wait_s = after.as_secs_f64(),
                last = last.as_str(),
                "retryable failure; waiting before retry"
            );
            sleep(after).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, HttpResponse};
    use crate::sink::MemorySink;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct SequenceHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl SequenceHttpClient {
        fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .len()
        }
    }

    impl HttpClient for SequenceHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self
                .responses
                .lock()
                .expect("response script should not be poisoned")
                .pop()
                .unwrap_or_else(|| Err(HttpError::non_retryable("response script exhausted")));
            Box::pin(async move { response })
        }
    }

    fn config() -> ConnectorConfig {
        ConnectorConfig::new("key-123").expect("valid config")
    }

    #[tokio::test]
    async fn empty_first_page_yields_no_records_and_stops() {
        let client = Arc::new(SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(
            r#"{"data":{"page":1,"trackings":[]}}"#,
        ))]));
        let mut walker = PageWalker::new(config(), client.clone(), None);
        let mut sink = MemorySink::default();

        let summary = walker.run(&mut sink).await.expect("run must succeed");

        assert_eq!(summary.records, 0);
        assert_eq!(summary.pages, 1);
        assert_eq!(client.request_count(), 1);
        assert!(sink.records.is_empty());
    }

    #[tokio::test]
    async fn client_error_aborts_without_retry() {
        let client = Arc::new(SequenceHttpClient::new(vec![Ok(HttpResponse::new(
            401, "",
        ))]));
        let mut walker = PageWalker::new(config(), client.clone(), None);
        let mut sink = MemorySink::default();

        let error = walker.run(&mut sink).await.expect_err("401 must abort");

        assert_eq!(client.request_count(), 1);
        match error {
            ExtractError::Fatal {
                status,
                reason,
                path,
            } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "Unauthorized");
                assert_eq!(path, "/trackings");
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_envelope_error() {
        let client = Arc::new(SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(
            "not json at all",
        ))]));
        let mut walker = PageWalker::new(config(), client, None);
        let mut sink = MemorySink::default();

        let error = walker
            .run(&mut sink)
            .await
            .expect_err("non-JSON body must fail");
        assert!(matches!(error, ExtractError::Envelope { .. }));
    }
}
