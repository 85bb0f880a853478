//! Profile and address endpoints under `/users/{id}`.

use bookbarn_core::{AddressId, UserId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::ApiClient;
use super::types::{Address, PostalAddress, UpdatePhoneRequest, UpdateProfileRequest, UserProfile};
use crate::error::{ApiError, Result};
use crate::session::AuthSession;

/// Largest avatar accepted before upload.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

impl ApiClient {
    /// Fetch the raw user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn user(&self, auth: &AuthSession) -> Result<UserProfile> {
        let url = self.user_endpoint(auth, &[])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Fetch a user's profile including their role.
    ///
    /// Works for any id the token may read; the backoffice uses it for other
    /// users, the storefront for the signed-in one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %user_id))]
    pub async fn user_profile(&self, auth: &AuthSession, user_id: UserId) -> Result<UserProfile> {
        let id = user_id.to_string();
        let url = self.endpoint(&["users", "dto", &id])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Update name, surname, birth date and username.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(user_id = %auth.user_id()))]
    pub async fn update_profile(&self, auth: &AuthSession, request: &UpdateProfileRequest) -> Result<()> {
        let url = self.user_endpoint(auth, &[])?;
        self.send_empty(self.request(Method::PUT, url, Some(auth)).json(request))
            .await
    }

    /// Set or replace the phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, phone_number), fields(user_id = %auth.user_id()))]
    pub async fn update_phone(&self, auth: &AuthSession, phone_number: &str) -> Result<()> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(ApiError::InvalidInput("phone number is empty".to_string()));
        }
        let url = self.user_endpoint(auth, &["phone"])?;
        let body = UpdatePhoneRequest {
            phone_number: phone_number.to_string(),
        };
        self.send_empty(self.request(Method::PATCH, url, Some(auth)).json(&body))
            .await
    }

    /// Upload a new avatar image as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for empty or oversized images, or an
    /// error if the upload fails.
    #[instrument(skip(self, auth, bytes), fields(user_id = %auth.user_id(), size = bytes.len()))]
    pub async fn update_avatar(&self, auth: &AuthSession, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("avatar image is empty".to_string()));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(ApiError::InvalidInput(format!(
                "avatar image exceeds {MAX_AVATAR_BYTES} bytes"
            )));
        }

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))?;
        let form = Form::new().part("file", part);

        let url = self.user_endpoint(auth, &["avatar"])?;
        self.send_empty(self.request(Method::PATCH, url, Some(auth)).multipart(form))
            .await
    }

    /// Delete the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn delete_account(&self, auth: &AuthSession) -> Result<()> {
        let url = self.user_endpoint(auth, &[])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn addresses(&self, auth: &AuthSession) -> Result<Vec<Address>> {
        let url = self.user_endpoint(auth, &["addresses"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, address), fields(user_id = %auth.user_id()))]
    pub async fn add_address(&self, auth: &AuthSession, address: &PostalAddress) -> Result<Address> {
        let url = self.user_endpoint(auth, &["addresses"])?;
        self.send(self.request(Method::POST, url, Some(auth)).json(address))
            .await
    }

    /// Replace a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, address), fields(user_id = %auth.user_id(), address_id = %id))]
    pub async fn update_address(
        &self,
        auth: &AuthSession,
        id: AddressId,
        address: &PostalAddress,
    ) -> Result<Address> {
        let id = id.to_string();
        let url = self.user_endpoint(auth, &["addresses", &id])?;
        self.send(self.request(Method::PUT, url, Some(auth)).json(address))
            .await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), address_id = %id))]
    pub async fn delete_address(&self, auth: &AuthSession, id: AddressId) -> Result<()> {
        let id = id.to_string();
        let url = self.user_endpoint(auth, &["addresses", &id])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await
    }
}

fn image_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(server: &MockServer) -> (ApiClient, AuthSession) {
        let api = ApiClient::with_http_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        (api, AuthSession::new("t1", UserId::new(42)))
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("me.PNG"), "image/png");
        assert_eq!(image_mime("me.jpeg"), "image/jpeg");
        assert_eq!(image_mime("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_user_profile_reads_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/dto/42"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42, "name": "Mario", "surname": "Rossi", "bornDate": "07/03/1990",
                "username": "mrossi", "email": "mario@libri.it", "role": "ROLE_ADMIN"
            })))
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        let profile = api.user_profile(&auth, auth.user_id()).await.unwrap();
        assert_eq!(profile.username, "mrossi");
        assert!(profile.role().is_backoffice());
    }

    #[tokio::test]
    async fn test_update_phone_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/users/42/phone"))
            .and(body_json(json!({"phoneNumber": "+39 333 1234567"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        api.update_phone(&auth, " +39 333 1234567 ").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_avatar_rejects_empty() {
        let server = MockServer::start().await;
        let (api, auth) = setup(&server);
        let err = api.update_avatar(&auth, "a.png", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_avatar_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/users/42/avatar"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        api.update_avatar(&auth, "a.png", vec![0x89, b'P', b'N', b'G'])
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file\""));
    }

    #[tokio::test]
    async fn test_addresses_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 3, "name": "Casa", "street": "Via Roma 1", "city": "Milano",
                "province": "MI", "country": "Italia", "postalCode": "20100"
            }])))
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        let addresses = api.addresses(&auth).await.unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].postal.city, "Milano");
    }
}
