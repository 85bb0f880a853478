//! Backoffice endpoints: categories, stock, products and staff.
//!
//! The backend checks the caller's role; these calls only need a session
//! whose user is staff or admin.

use bookbarn_core::{CategoryId, ProductId, StockDirection, UserId, UserRole};
use reqwest::Method;
use tracing::{info, instrument};

use super::ApiClient;
use super::types::{
    AssignRoleRequest, Category, CategoryRequest, CreateProductRequest, CreateStaffRequest,
    InventoryItem, Page, ProductPage, ProductSearch, StockAdjustment, UpdateProductRequest,
    UserPage,
};
use crate::error::{ApiError, Result};
use crate::session::AuthSession;

/// Page size of the backoffice listings.
pub const BACKOFFICE_PAGE_SIZE: u32 = 20;

impl ApiClient {
    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn categories(&self, auth: &AuthSession) -> Result<Vec<Category>> {
        let url = self.endpoint(&["categories"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(name = %request.name))]
    pub async fn create_category(&self, auth: &AuthSession, request: &CategoryRequest) -> Result<()> {
        let url = self.endpoint(&["categories"])?;
        self.send_empty(self.request(Method::POST, url, Some(auth)).json(request))
            .await
    }

    /// Rename or retype a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        auth: &AuthSession,
        id: CategoryId,
        request: &CategoryRequest,
    ) -> Result<()> {
        let segment = id.to_string();
        let url = self.endpoint(&["categories", &segment])?;
        self.send_empty(self.request(Method::PUT, url, Some(auth)).json(request))
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(category_id = %id))]
    pub async fn delete_category(&self, auth: &AuthSession, id: CategoryId) -> Result<()> {
        let segment = id.to_string();
        let url = self.endpoint(&["categories", &segment])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Stock levels of every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn stock_levels(&self, auth: &AuthSession) -> Result<Vec<InventoryItem>> {
        let url = self.endpoint(&["products", "stock"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Increase or decrease a product's stock.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a zero quantity, or an error if
    /// the API request fails.
    #[instrument(skip(self, auth), fields(product_id = %product_id, direction = direction.path_segment()))]
    pub async fn adjust_stock(
        &self,
        auth: &AuthSession,
        product_id: ProductId,
        direction: StockDirection,
        quantity: u32,
    ) -> Result<()> {
        if quantity == 0 {
            return Err(ApiError::InvalidInput("quantity must be at least 1".to_string()));
        }
        let segment = product_id.to_string();
        let url = self.endpoint(&["products", &segment, "stock", direction.path_segment()])?;
        let body = StockAdjustment { quantity };
        self.send_empty(self.request(Method::POST, url, Some(auth)).json(&body))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Find products for the backoffice listing.
    ///
    /// An all-digit term is treated as a product id; any other term is
    /// matched against title, ISBN and author. An empty term lists
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn find_products(&self, term: &str, page: u32) -> Result<ProductPage> {
        let term = term.trim();

        if !term.is_empty()
            && term.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = term.parse::<ProductId>()
        {
            let product = self.product(id).await?;
            return Ok(Page::single(vec![product]));
        }

        let search = if term.is_empty() {
            ProductSearch::default()
        } else {
            ProductSearch::any_field(term)
        };
        self.search_products(&search.page(page).size(BACKOFFICE_PAGE_SIZE))
            .await
    }

    /// Create a product with its initial stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(title = %request.title))]
    pub async fn create_product(&self, auth: &AuthSession, request: &CreateProductRequest) -> Result<()> {
        let url = self.endpoint(&["products"])?;
        self.send_empty(self.request(Method::POST, url, Some(auth)).json(request))
            .await?;
        self.invalidate_catalog().await;
        info!("Product created");
        Ok(())
    }

    /// Replace a product's details.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        auth: &AuthSession,
        id: ProductId,
        request: &UpdateProductRequest,
    ) -> Result<()> {
        let segment = id.to_string();
        let url = self.endpoint(&["products", &segment])?;
        self.send_empty(self.request(Method::PUT, url, Some(auth)).json(request))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a product. The backend refuses products that were ordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(product_id = %id))]
    pub async fn delete_product(&self, auth: &AuthSession, id: ProductId) -> Result<()> {
        let segment = id.to_string();
        let url = self.endpoint(&["products", &segment])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await?;
        self.invalidate_catalog().await;
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Search users by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn search_users(&self, auth: &AuthSession, query: &str, page: u32) -> Result<UserPage> {
        let mut url = self.endpoint(&["users", "dto", "search"])?;
        url.query_pairs_mut()
            .append_pair("query", query.trim())
            .append_pair("page", &page.to_string())
            .append_pair("size", &BACKOFFICE_PAGE_SIZE.to_string());
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth, request), fields(username = %request.username, role = %request.role))]
    pub async fn create_staff(&self, auth: &AuthSession, request: &CreateStaffRequest) -> Result<()> {
        let url = self.endpoint(&["admin", "users"])?;
        self.send_empty(self.request(Method::POST, url, Some(auth)).json(request))
            .await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %user_id, role = %role))]
    pub async fn assign_role(&self, auth: &AuthSession, user_id: UserId, role: UserRole) -> Result<()> {
        let segment = user_id.to_string();
        let url = self.endpoint(&["admin", "users", &segment, "role"])?;
        let body = AssignRoleRequest { role };
        self.send_empty(self.request(Method::PATCH, url, Some(auth)).json(&body))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(server: &MockServer) -> (ApiClient, AuthSession) {
        let api = ApiClient::with_http_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        (api, AuthSession::new("admin-token", UserId::new(1)))
    }

    #[tokio::test]
    async fn test_adjust_stock_path_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products/7/stock/decrease"))
            .and(body_json(json!({"quantity": 3})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        api.adjust_stock(&auth, ProductId::new(7), StockDirection::Decrease, 3)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_products_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12, "title": "Emma", "price": 4.5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = setup(&server);
        let page = api.find_products(" 12 ", 0).await.unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_find_products_by_text_matches_every_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/search"))
            .and(query_param("title", "herbert"))
            .and(query_param("isbn", "herbert"))
            .and(query_param("author", "herbert"))
            .and(query_param("size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [], "totalPages": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = setup(&server);
        let page = api.find_products("herbert", 0).await.unwrap();
        assert!(page.content.is_empty());
    }

    #[tokio::test]
    async fn test_assign_role() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/admin/users/9/role"))
            .and(body_json(json!({"role": "STAFF"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        api.assign_role(&auth, UserId::new(9), UserRole::Staff)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_users_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/dto/search"))
            .and(query_param("query", "rossi"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{
                    "id": 9, "username": "mrossi", "email": "mario@libri.it",
                    "name": "Mario", "surname": "Rossi", "role": "USER"
                }],
                "totalPages": 2, "number": 1
            })))
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        let page = api.search_users(&auth, "rossi", 1).await.unwrap();
        assert_eq!(page.content[0].role, UserRole::User);
        assert!(!page.has_next());
    }
}
