//! Catalog reads, cached in memory.

use bookbarn_core::ProductId;
use reqwest::Method;
use tracing::{debug, instrument};

use super::ApiClient;
use super::cache::{CacheKey, CacheValue};
use super::types::{Product, ProductPage, ProductSearch};
use crate::error::Result;

impl ApiClient {
    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 404 if the product does not exist, or
    /// an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let segment = id.to_string();
        let url = self.endpoint(&["products", &segment])?;
        let product: Product = self.send(self.request(Method::GET, url, None)).await?;

        self.cache()
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Search the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(page = search.page, size = search.size))]
    pub async fn search_products(&self, search: &ProductSearch) -> Result<ProductPage> {
        let cache_key = CacheKey::Search(search.clone());

        if let Some(CacheValue::Search(page)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product search");
            return Ok(page);
        }

        let mut url = self.endpoint(&["products", "search"])?;
        url.query_pairs_mut().extend_pairs(search.query_pairs());
        let page: ProductPage = self.send(self.request(Method::GET, url, None)).await?;

        // Warm the per-product cache from the page
        for product in &page.content {
            self.cache()
                .insert(
                    CacheKey::Product(product.id),
                    CacheValue::Product(Box::new(product.clone())),
                )
                .await;
        }

        self.cache()
            .insert(cache_key, CacheValue::Search(page.clone()))
            .await;

        Ok(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::with_http_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_product_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "title": "Dune", "price": 9.99, "author": "Frank Herbert"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        let first = api.product(ProductId::new(7)).await.unwrap();
        let second = api.product(ProductId::new(7)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.author, vec!["Frank Herbert".to_string()]);
    }

    #[tokio::test]
    async fn test_invalidate_product_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "title": "Dune", "price": 9.99
            })))
            .expect(2)
            .mount(&server)
            .await;

        let api = client(&server);
        api.product(ProductId::new(7)).await.unwrap();
        api.invalidate_product(ProductId::new(7)).await;
        api.product(ProductId::new(7)).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_sends_query_and_warms_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/search"))
            .and(query_param("title", "dune"))
            .and(query_param("page", "0"))
            .and(query_param("size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 7, "title": "Dune", "price": 9.99}],
                "totalPages": 1, "number": 0, "size": 50
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        let page = api
            .search_products(&ProductSearch::by_title("dune"))
            .await
            .unwrap();
        assert_eq!(page.content.len(), 1);
        assert!(!page.has_next());

        // Served from the warmed cache; /products/7 has no mock.
        let product = api.product(ProductId::new(7)).await.unwrap();
        assert_eq!(product.title, "Dune");
    }
}
