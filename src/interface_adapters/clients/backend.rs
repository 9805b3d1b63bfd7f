use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::{
    ApiError, LoginRequest, LoginResponse, PickupPerson, PortalApi, ProfileUpdateRequest,
    RecyclingRequest, RegistrationRequest, RequestSubmission, ScheduleRequest, StatusCount,
    StatusUpdateRequest,
};
use crate::interface_adapters::clients::ClientBuildError;
use crate::interface_adapters::protocol::error_message;

// Which calls treat 401 as an expired session. The auth endpoints answer 401
// for bad credentials, and their message is what the user should see.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Auth {
    Public,
    Protected,
}

// Thin reqwest client for the portal's REST backend.
pub struct BackendClient {
    http: Client,
    base_url: Url,
    bearer: RwLock<Option<String>>,
}

impl BackendClient {
    /// `timeout` of `None` lets calls wait as long as the backend takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientBuildError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: directory_url(base_url)?,
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Encode(err.to_string()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, auth: Auth) -> Result<Response, ApiError> {
        let res = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        // Keep the status and backend message so views can show it.
        match status {
            StatusCode::UNAUTHORIZED if auth == Auth::Protected => Err(ApiError::Unauthorized),
            StatusCode::PAYLOAD_TOO_LARGE => Err(ApiError::PayloadTooLarge),
            _ => {
                let body = res.text().await.unwrap_or_default();
                Err(ApiError::Upstream {
                    status: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let res = self.send(self.http.get(url), Auth::Protected).await?;
        res.json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn put_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.put(url).json(body), Auth::Protected)
            .await
            .map(drop)
    }
}

// A base without a trailing slash would lose its last segment on join.
fn directory_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn multipart(submission: RequestSubmission) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in submission.fields {
        form = form.text(name, value);
    }
    for image in submission.images {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|err| ApiError::Encode(err.to_string()))?;
        form = form.part("images", part);
    }
    Ok(form)
}

#[async_trait]
impl PortalApi for BackendClient {
    fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("api/auth/login")?;
        let res = self.send(self.http.post(url).json(&req), Auth::Public).await?;
        res.json::<LoginResponse>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn register(&self, req: RegistrationRequest) -> Result<(), ApiError> {
        let url = self.endpoint("api/auth/register")?;
        self.send(self.http.post(url).json(&req), Auth::Public)
            .await
            .map(drop)
    }

    async fn my_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.get_json("api/requests/user").await
    }

    async fn submit_request(&self, submission: RequestSubmission) -> Result<(), ApiError> {
        let url = self.endpoint("api/requests")?;
        let form = multipart(submission)?;
        self.send(self.http.post(url).multipart(form), Auth::Protected)
            .await
            .map(drop)
    }

    async fn all_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.get_json("api/requests").await
    }

    async fn pickup_persons(&self) -> Result<Vec<PickupPerson>, ApiError> {
        self.get_json("api/admin/pickup-persons").await
    }

    async fn assigned_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.get_json("api/pickup/my-assigned-requests").await
    }

    async fn update_request_status(
        &self,
        request_id: i64,
        update: StatusUpdateRequest,
    ) -> Result<(), ApiError> {
        self.put_json(&format!("api/requests/{request_id}/status"), &update)
            .await
    }

    async fn schedule_pickup(
        &self,
        request_id: i64,
        schedule: ScheduleRequest,
    ) -> Result<(), ApiError> {
        self.put_json(&format!("api/requests/{request_id}/schedule"), &schedule)
            .await
    }

    async fn my_status_counts(&self) -> Result<Vec<StatusCount>, ApiError> {
        self.get_json("api/user/my-stats/requests-by-status").await
    }

    async fn certificate_pdf(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint("api/user/certificate/generate")?;
        let res = self.send(self.http.get(url), Auth::Protected).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn update_profile(&self, req: ProfileUpdateRequest) -> Result<(), ApiError> {
        self.put_json("api/user/profile", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_base_url_has_a_path_then_endpoints_keep_it() {
        let client = BackendClient::new("http://localhost:8080/portal", None).expect("client");

        let url = client.endpoint("api/requests/user").expect("url");

        assert_eq!(url.as_str(), "http://localhost:8080/portal/api/requests/user");
    }

    #[test]
    fn when_base_url_is_not_a_url_then_construction_fails() {
        assert!(matches!(
            BackendClient::new("localhost 8080", None),
            Err(ClientBuildError::InvalidUrl(_))
        ));
    }

    #[test]
    fn when_submission_has_bad_content_type_then_encoding_fails() {
        let submission = RequestSubmission {
            fields: vec![("deviceType", "LAPTOP".to_string())],
            images: vec![crate::domain::ImageFile {
                file_name: "front.jpg".to_string(),
                content_type: "not a mime".to_string(),
                bytes: vec![1, 2, 3],
            }],
        };

        assert!(matches!(multipart(submission), Err(ApiError::Encode(_))));
    }
}
