//! Fetch-then-render operations
//!
//! Each operation fetches from the catalog API and rewrites one page
//! container. Product list and category tags swallow and log their errors;
//! count and category filter hand them back to the caller.

use crate::api::{ApiError, CatalogClient};
use crate::page::events::{ClickEvent, ClickHandler};
use crate::page::{create_li, ElementId, Node, SharedPage, Tag, TAG_CLASS};

/// Total number of anti-waste products, as text
pub async fn product_left(client: &CatalogClient) -> Result<String, ApiError> {
    let catalog = client.fetch_catalog().await?;
    Ok(catalog.waste_count.unwrap_or_default())
}

/// Write the product count into `#gaspi-count`
pub async fn display_count(client: &CatalogClient, page: &SharedPage) -> Result<(), ApiError> {
    let count = product_left(client).await?;
    page.with_element(ElementId::GaspiCount, |el| el.set_text_content(count));
    Ok(())
}

/// Render every recipe of the catalog into `#gaspi-list`.
/// Once the catalog has arrived the list is cleared, even if its recipes turn
/// out to be unusable.
pub async fn display_products(client: &CatalogClient, page: &SharedPage) {
    let catalog = match client.fetch_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to display products: {}", e);
            return;
        }
    };

    page.with_element(ElementId::GaspiList, |list| {
        list.clear();
        match catalog.receipes() {
            Ok(products) => {
                for product in &products {
                    create_li(list, &product.title, &product.description);
                }
            }
            Err(e) => tracing::error!("Failed to display products: bad waste-receipes: {}", e),
        }
    });
}

/// Render one clickable tag per category into `#cat-tags`
pub async fn product_categories(client: &CatalogClient, page: &SharedPage) {
    let catalog = match client.fetch_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to display categories: {}", e);
            return;
        }
    };

    page.with_element(ElementId::CatTags, |tags| {
        tags.clear();
        for category in catalog.categories {
            tags.append(Node::Tag(Tag {
                label: category,
                class: TAG_CLASS,
                on_click: Some(ClickHandler::FilterByCategory),
            }));
        }
    });
}

/// Show the products of the clicked category in `#categorie-list`.
/// The list is cleared before the request goes out.
pub async fn display_category(
    client: &CatalogClient,
    page: &SharedPage,
    event: &ClickEvent,
) -> Result<(), ApiError> {
    let category = event.text.trim();

    page.with_element(ElementId::CategorieList, |list| list.clear());
    tracing::debug!("{}[{}] clicked: {}", event.target, event.index, category);

    let products = client.fetch_category(category).await?;

    page.with_element(ElementId::CategorieList, |list| {
        for product in &products {
            create_li(list, &product.title, &product.description);
        }
    });
    Ok(())
}

/// Empty `#categorie-list`
pub fn clear_category_list(page: &SharedPage) {
    page.with_element(ElementId::CategorieList, |list| list.clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::page::events::{dispatch, Command};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CatalogClient {
        let config = ResolvedConfig {
            api_base: server.uri(),
            ..ResolvedConfig::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    async fn serve_catalog(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/antigaspi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn sample_catalog() -> serde_json::Value {
        json!({
            "waste-count": 3,
            "waste-receipes": [
                { "title": "Soupe", "description": "Fanes de radis" },
                { "title": "Pain perdu", "description": "Pain rassis" },
                { "title": "Compote", "description": "Pommes abîmées" }
            ],
            "categories": ["A", "B"]
        })
    }

    #[tokio::test]
    async fn test_display_count() {
        let server = MockServer::start().await;
        serve_catalog(&server, sample_catalog()).await;
        let page = SharedPage::new();

        display_count(&client_for(&server), &page).await.unwrap();
        assert_eq!(page.lock().element(ElementId::GaspiCount).text_content(), "3");
    }

    #[tokio::test]
    async fn test_display_count_error_leaves_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let page = SharedPage::new();
        page.with_element(ElementId::GaspiCount, |el| el.set_text_content("7"));

        let result = display_count(&client_for(&server), &page).await;
        assert!(result.is_err());
        assert_eq!(page.lock().element(ElementId::GaspiCount).text_content(), "7");
    }

    #[tokio::test]
    async fn test_display_products_renders_each_recipe() {
        let server = MockServer::start().await;
        serve_catalog(&server, sample_catalog()).await;
        let page = SharedPage::new();

        display_products(&client_for(&server), &page).await;

        let page = page.snapshot();
        let items: Vec<_> = page.element(ElementId::GaspiList).items().cloned().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].heading, "Pain perdu");
        assert_eq!(items[1].paragraph, "Pain rassis");
        assert!(items.iter().all(|item| item.button.label == "Acheter"));
    }

    #[tokio::test]
    async fn test_display_products_rerender_does_not_duplicate() {
        let server = MockServer::start().await;
        serve_catalog(&server, sample_catalog()).await;
        let client = client_for(&server);
        let page = SharedPage::new();

        display_products(&client, &page).await;
        display_products(&client, &page).await;

        assert_eq!(page.lock().element(ElementId::GaspiList).len(), 3);
    }

    #[tokio::test]
    async fn test_display_products_error_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let page = SharedPage::new();
        page.with_element(ElementId::GaspiList, |list| create_li(list, "old", "item"));

        display_products(&client_for(&server), &page).await;

        let page = page.snapshot();
        assert_eq!(page.element(ElementId::GaspiList).len(), 1);
        assert_eq!(page.element(ElementId::GaspiList).text_content(), "olditemAcheter");
    }

    #[tokio::test]
    async fn test_catalog_without_recipes_still_shows_count_and_tags() {
        let server = MockServer::start().await;
        serve_catalog(&server, json!({ "waste-count": 4, "categories": ["A", "B"] })).await;
        let client = client_for(&server);
        let page = SharedPage::new();
        page.with_element(ElementId::GaspiList, |list| create_li(list, "old", "item"));

        display_count(&client, &page).await.unwrap();
        display_products(&client, &page).await;
        product_categories(&client, &page).await;

        let page = page.snapshot();
        assert_eq!(page.element(ElementId::GaspiCount).text_content(), "4");
        assert!(page.element(ElementId::GaspiList).is_empty());
        assert_eq!(page.element(ElementId::CatTags).tags().count(), 2);
    }

    #[tokio::test]
    async fn test_display_count_keeps_string_count() {
        let server = MockServer::start().await;
        serve_catalog(&server, json!({ "waste-count": "12", "waste-receipes": [] })).await;
        let page = SharedPage::new();

        display_count(&client_for(&server), &page).await.unwrap();
        assert_eq!(page.lock().element(ElementId::GaspiCount).text_content(), "12");
    }

    #[tokio::test]
    async fn test_product_categories_renders_clickable_tags() {
        let server = MockServer::start().await;
        serve_catalog(&server, sample_catalog()).await;
        let page = SharedPage::new();

        product_categories(&client_for(&server), &page).await;

        let page = page.snapshot();
        let tags: Vec<_> = page.element(ElementId::CatTags).tags().cloned().collect();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].label, "A");
        assert_eq!(tags[1].label, "B");
        assert!(tags
            .iter()
            .all(|t| t.class == "tag" && t.on_click == Some(ClickHandler::FilterByCategory)));
    }

    #[tokio::test]
    async fn test_product_categories_without_array_is_empty() {
        let server = MockServer::start().await;
        serve_catalog(&server, json!({ "waste-receipes": [], "categories": "A,B" })).await;
        let page = SharedPage::new();
        page.with_element(ElementId::CatTags, |tags| tags.set_text_content("stale"));

        product_categories(&client_for(&server), &page).await;

        assert!(page.lock().element(ElementId::CatTags).is_empty());
    }

    #[tokio::test]
    async fn test_tag_click_fetches_category() {
        let server = MockServer::start().await;
        serve_catalog(&server, sample_catalog()).await;
        Mock::given(method("GET"))
            .and(path("/A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "title": "Tarte", "description": "Fruits mûrs" }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);
        let page = SharedPage::new();
        page.with_element(ElementId::CategorieList, |list| create_li(list, "old", ""));

        product_categories(&client, &page).await;
        let command = dispatch(&page.snapshot(), ElementId::CatTags, 0);
        let Some(Command::ShowCategory(event)) = command else {
            panic!("tag should dispatch a category command");
        };
        display_category(&client, &page, &event).await.unwrap();

        let page = page.snapshot();
        let items: Vec<_> = page.element(ElementId::CategorieList).items().cloned().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].heading, "Tarte");
    }

    #[tokio::test]
    async fn test_display_category_trims_and_encodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Fruits%20%26%20L%C3%A9gumes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        let event = ClickEvent {
            target: ElementId::CatTags,
            index: 0,
            text: "  Fruits & Légumes \n".to_string(),
        };

        display_category(&client_for(&server), &SharedPage::new(), &event)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_display_category_clears_before_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/B"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "title": "Gratin" }]))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        let client = client_for(&server);
        let page = SharedPage::new();
        page.with_element(ElementId::CategorieList, |list| create_li(list, "old", ""));
        let event = ClickEvent {
            target: ElementId::CatTags,
            index: 1,
            text: "B".to_string(),
        };

        let task = {
            let page = page.clone();
            tokio::spawn(async move { display_category(&client, &page, &event).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(page.lock().element(ElementId::CategorieList).is_empty());

        task.await.unwrap().unwrap();
        let page = page.snapshot();
        let list = page.element(ElementId::CategorieList);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items().next().map(|i| i.paragraph.as_str()), Some(""));
    }

    #[tokio::test]
    async fn test_display_category_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "oops": true })))
            .mount(&server)
            .await;
        let event = ClickEvent {
            target: ElementId::CatTags,
            index: 0,
            text: "A".to_string(),
        };

        let result = display_category(&client_for(&server), &SharedPage::new(), &event).await;
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
