//! HTTP boundary to the feedback service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::FeedbackRecord,
    error::ErrorBody,
    protocol::{
        paths, FeedbackListResponse, ResultResponse, SignInRequest, SignInResponse,
        SignUpRequest, SubmitCommentRequest, SubmitFeedbackRequest, ACCESS_TOKEN_HEADER,
    },
};
use tracing::debug;
use url::Url;

use crate::error::ApiFailure;

#[async_trait]
pub trait FeedbackApi: Send + Sync {
    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, ApiFailure>;
    async fn sign_up(&self, request: SignUpRequest) -> Result<(), ApiFailure>;
    async fn sign_out(&self, token: &str) -> Result<(), ApiFailure>;
    async fn list_feedback(&self, token: &str) -> Result<Vec<FeedbackRecord>, ApiFailure>;
    async fn submit_feedback(
        &self,
        token: &str,
        request: SubmitFeedbackRequest,
    ) -> Result<(), ApiFailure>;
    async fn submit_comment(
        &self,
        token: &str,
        request: SubmitCommentRequest,
    ) -> Result<(), ApiFailure>;
}

pub struct HttpFeedbackApi {
    http: Client,
    base_url: Url,
}

impl HttpFeedbackApi {
    /// Without a timeout a request waits for as long as the server takes.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ApiFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiFailure::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiFailure> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiFailure::Transport(format!("invalid endpoint '{path}': {err}")))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ApiFailure> {
        Ok(self.http.post(self.endpoint(path)?))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiFailure> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "feedback service responded");
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(ApiFailure::rejected(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiFailure> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiFailure::MalformedResponse(err.to_string()))
    }

    /// Endpoints answering `{result, message}`: `result: false` is a rejection.
    async fn send_for_result(request: RequestBuilder) -> Result<(), ApiFailure> {
        let response = Self::send(request).await?;
        let status = response.status().as_u16();
        let body: ResultResponse = response
            .json()
            .await
            .map_err(|err| ApiFailure::MalformedResponse(err.to_string()))?;
        if body.result {
            Ok(())
        } else {
            Err(ApiFailure::rejected(status, body.message))
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl FeedbackApi for HttpFeedbackApi {
    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, ApiFailure> {
        Self::send_json(self.post(paths::SIGN_IN)?.json(&request)).await
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<(), ApiFailure> {
        Self::send(self.post(paths::SIGN_UP)?.json(&request)).await?;
        Ok(())
    }

    async fn sign_out(&self, token: &str) -> Result<(), ApiFailure> {
        Self::send_for_result(self.post(paths::SIGN_OUT)?.header(ACCESS_TOKEN_HEADER, token)).await
    }

    async fn list_feedback(&self, token: &str) -> Result<Vec<FeedbackRecord>, ApiFailure> {
        let request = self
            .http
            .get(self.endpoint(paths::FEEDBACK_LIST)?)
            .header(ACCESS_TOKEN_HEADER, token);
        let body: FeedbackListResponse = Self::send_json(request).await?;
        Ok(body.feedback)
    }

    async fn submit_feedback(
        &self,
        token: &str,
        request: SubmitFeedbackRequest,
    ) -> Result<(), ApiFailure> {
        Self::send_for_result(
            self.post(paths::FEEDBACK_SUBMIT)?
                .header(ACCESS_TOKEN_HEADER, token)
                .json(&request),
        )
        .await
    }

    async fn submit_comment(
        &self,
        token: &str,
        request: SubmitCommentRequest,
    ) -> Result<(), ApiFailure> {
        Self::send_for_result(
            self.post(paths::COMMENT_SUBMIT)?
                .header(ACCESS_TOKEN_HEADER, token)
                .json(&request),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
