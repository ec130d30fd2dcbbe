//! Microsoft Graph drive client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::error::GraphError;
use super::item::{ChildrenPage, CreateFolderRequest, DriveItem, FolderId};
use crate::auth::CredentialProvider;
use crate::util::http::{bearer_headers, build_client};

pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// The drive operations the upload workflow needs, all rooted at `/me/drive/root`.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// `GET /me/drive/root:/<path>`.
    async fn get_item_by_path(&self, path: &str) -> Result<DriveItem, GraphError>;

    /// `GET /me/drive/root/children?$filter=<filter>`, all pages.
    async fn list_root_children(&self, filter: &str) -> Result<Vec<DriveItem>, GraphError>;

    /// `POST /me/drive/root/children`.
    async fn create_root_folder(
        &self,
        request: &CreateFolderRequest,
    ) -> Result<DriveItem, GraphError>;

    /// `PUT /me/drive/items/<folder>:/<file_name>:/content`.
    async fn put_content(
        &self,
        folder: &FolderId,
        file_name: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<DriveItem, GraphError>;
}

/// reqwest-backed Graph client. Every request asks the credential provider
/// for a token first, so renewals happen transparently.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use meetai::auth::CredentialProvider;
/// use meetai::drive::GraphClient;
///
/// # fn example(credentials: Arc<dyn CredentialProvider>) -> Result<(), meetai::drive::GraphError> {
/// let client = GraphClient::new(credentials)?;
/// # Ok(())
/// # }
/// ```
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GraphClient {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Result<Self, GraphError> {
        Ok(Self {
            client: build_client()?,
            base_url: DEFAULT_GRAPH_URL.to_string(),
            credentials,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GraphError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| GraphError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GraphError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, GraphError> {
        let credential = self.credentials.acquire_token().await?;
        Ok(builder.headers(bearer_headers(&credential.access_token)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GraphError> {
        tracing::debug!(%url, "GET");
        let resp = self.authorized(self.client.get(url)).await?.send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GraphError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(GraphError::from_response(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Quote a value for an OData string literal.
pub fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl DriveApi for GraphClient {
    async fn get_item_by_path(&self, path: &str) -> Result<DriveItem, GraphError> {
        let mut segments = vec!["me", "drive", "root:"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments)?;
        self.get_json(url).await
    }

    async fn list_root_children(&self, filter: &str) -> Result<Vec<DriveItem>, GraphError> {
        let mut url = self.endpoint(&["me", "drive", "root", "children"])?;
        url.query_pairs_mut().append_pair("$filter", filter);

        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page: ChildrenPage = self.get_json(url).await?;
            items.extend(page.value);
            next = match page.next_link {
                Some(link) => {
                    Some(Url::parse(&link).map_err(|e| GraphError::InvalidUrl(e.to_string()))?)
                }
                None => None,
            };
        }
        Ok(items)
    }

    async fn create_root_folder(
        &self,
        request: &CreateFolderRequest,
    ) -> Result<DriveItem, GraphError> {
        let url = self.endpoint(&["me", "drive", "root", "children"])?;
        tracing::debug!(%url, folder = %request.name, "POST");
        let resp = self
            .authorized(self.client.post(url))
            .await?
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }

    async fn put_content(
        &self,
        folder: &FolderId,
        file_name: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<DriveItem, GraphError> {
        let folder_segment = format!("{folder}:");
        let file_segment = format!("{file_name}:");
        let url = self.endpoint(&["me", "drive", "items", &folder_segment, &file_segment, "content"])?;
        tracing::debug!(%url, bytes = body.len(), "PUT");
        let resp = self
            .authorized(self.client.put(url))
            .await?
            .header(CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .send()
            .await?;
        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, Credential};

    struct NoCredentials;

    #[async_trait]
    impl CredentialProvider for NoCredentials {
        async fn acquire_token(&self) -> Result<Credential, AuthError> {
            Err(AuthError::NotLoggedIn)
        }
    }

    fn client(base: &str) -> GraphClient {
        GraphClient::new(Arc::new(NoCredentials))
            .unwrap()
            .with_base_url(base)
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let client = client("https://graph.example.com/v1.0/");
        let url = client
            .endpoint(&["me", "drive", "root:", "Meeting notes"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.example.com/v1.0/me/drive/root:/Meeting%20notes"
        );
    }

    #[test]
    fn content_endpoint_uses_colon_addressing() {
        let client = client("https://graph.example.com/v1.0");
        let url = client
            .endpoint(&["me", "drive", "items", "X:", "meeting_1.wav:", "content"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.example.com/v1.0/me/drive/items/X:/meeting_1.wav:/content"
        );
    }

    #[test]
    fn odata_string_escapes_quotes() {
        assert_eq!(odata_string("Ada's audio"), "'Ada''s audio'");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let client = client("http://127.0.0.1:9");
        let err = client.get_item_by_path("Audio").await.unwrap_err();
        assert!(matches!(err, GraphError::Auth(AuthError::NotLoggedIn)));
    }
}
