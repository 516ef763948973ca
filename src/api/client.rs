//! HTTP client for the job board REST API.
//!
//! This module provides the `ApiClient` struct for making requests to the
//! auth, job, application, and CV endpoints. Authenticated requests carry
//! an `Authorization: Bearer <token>` header; callers are expected to
//! obtain tokens through the session manager.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthApi;
use crate::models::{
    Cv, Job, JobApplication, JobInput, JobPage, JobSearchPage, LoginTokens, NewUser, ProfileUpdate,
    UserProfile,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The backend rejects CV uploads above 2 MiB; checked client-side too so
/// oversized files never leave the device.
pub const MAX_CV_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// API client for the job board backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    /// (e.g. `https://jobs.example.com`, no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if a response is successful, converting failures into the
    /// error taxonomy with the backend's `detail` message attached.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = Self::bearer(self.client.get(&url), token).send().await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = Self::bearer(self.client.post(&url), token)
            .json(body)
            .send()
            .await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    /// POST where only the status matters; the response body is discarded.
    async fn post_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = Self::bearer(self.client.post(&url), token)
            .json(body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "PUT");
        let response = Self::bearer(self.client.put(&url), token)
            .json(body)
            .send()
            .await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    /// PUT where only the status matters; the response body is discarded.
    async fn put_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(url = %url, "PUT");
        let response = Self::bearer(self.client.put(&url), token)
            .json(body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str, token: Option<&str>) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(url = %url, "DELETE");
        let response = Self::bearer(self.client.delete(&url), token).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Auth & profile =====

    /// Authenticate with email and password, returning the token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_json("/api/login/", &body, None).await
    }

    /// Create a new account. The backend responds with the created user,
    /// which callers rarely need; login afterwards to obtain tokens.
    pub async fn register(&self, new_user: &NewUser) -> Result<(), ApiError> {
        self.post_unit("/api/register/", new_user, None).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        #[derive(Deserialize)]
        struct Refreshed {
            access: String,
        }
        let body = serde_json::json!({ "refresh": refresh_token });
        let refreshed: Refreshed = self.post_json("/api/token/refresh/", &body, None).await?;
        Ok(refreshed.access)
    }

    /// Fetch the authenticated user's profile.
    pub async fn me(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        self.get_json("/api/me", Some(access_token)).await
    }

    pub async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "current_password": current_password,
            "new_password": new_password,
        });
        self.post_unit("/api/me/change-password/", &body, Some(access_token))
            .await
    }

    pub async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        self.put_unit("/api/me/update/", update, Some(access_token))
            .await
    }

    pub async fn delete_account(&self, access_token: &str) -> Result<(), ApiError> {
        self.delete_unit("/api/me/delete/", Some(access_token)).await
    }

    // ===== Jobs =====

    /// Fetch one page of the job listing, newest first.
    pub async fn jobs(&self, page: u32) -> Result<JobPage, ApiError> {
        self.get_json(&format!("/api/jobs/?page={page}"), None).await
    }

    /// Full-text job search with typo tolerance, handled server-side.
    pub async fn search_jobs(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<JobSearchPage, ApiError> {
        let path = format!(
            "/api/jobs/search/?q={}&page={}&page_size={}",
            urlencoding::encode(query),
            page,
            page_size
        );
        self.get_json(&path, None).await
    }

    pub async fn job(&self, id: i64) -> Result<Job, ApiError> {
        self.get_json(&format!("/api/jobs/{id}/"), None).await
    }

    /// Create a job posting (admin accounts only).
    pub async fn create_job(&self, access_token: &str, input: &JobInput) -> Result<Job, ApiError> {
        self.post_json("/api/jobs/", input, Some(access_token)).await
    }

    /// Update a job posting (admin accounts only).
    pub async fn update_job(
        &self,
        access_token: &str,
        id: i64,
        input: &JobInput,
    ) -> Result<Job, ApiError> {
        self.put_json(&format!("/api/jobs/{id}/"), input, Some(access_token))
            .await
    }

    pub async fn delete_job(&self, access_token: &str, id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/api/jobs/{id}/"), Some(access_token))
            .await
    }

    /// Apply to a job with one of the caller's CVs and an optional note.
    /// The backend rejects duplicate applications with a 400 `detail`.
    pub async fn apply_to_job(
        &self,
        access_token: &str,
        job_id: i64,
        cv_id: i64,
        note: Option<&str>,
    ) -> Result<JobApplication, ApiError> {
        let body = serde_json::json!({ "cv_id": cv_id, "note": note.unwrap_or("") });
        self.post_json(
            &format!("/api/jobs/{job_id}/apply/"),
            &body,
            Some(access_token),
        )
        .await
    }

    /// List applications for a job (admin accounts only).
    pub async fn job_applicants(
        &self,
        access_token: &str,
        job_id: i64,
    ) -> Result<Vec<JobApplication>, ApiError> {
        self.get_json(
            &format!("/api/jobs/{job_id}/applicants/"),
            Some(access_token),
        )
        .await
    }

    // ===== CVs =====

    pub async fn my_cvs(&self, access_token: &str) -> Result<Vec<Cv>, ApiError> {
        self.get_json("/api/me/cvs/", Some(access_token)).await
    }

    /// Upload a CV as multipart form data under the `file` field.
    pub async fn upload_cv(
        &self,
        access_token: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Cv, ApiError> {
        if bytes.len() > MAX_CV_UPLOAD_BYTES {
            return Err(ApiError::UploadTooLarge {
                size: bytes.len(),
                limit: MAX_CV_UPLOAD_BYTES,
            });
        }

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);

        let url = self.url("/api/me/cvs/upload/");
        debug!(url = %url, file = file_name, "POST multipart");
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await?;
        Self::parse_json(Self::check_response(response).await?).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        self.refresh(refresh_token).await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        self.me(access_token).await
    }
}
