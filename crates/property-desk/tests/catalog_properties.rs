use std::collections::HashSet;
use std::sync::Arc;

use property_desk::catalog::{
    CatalogError, CatalogService, PropertyInput, PropertyRepository, PAGE_SIZE,
};
use property_desk::storage::{MemoryStore, SqliteStore};

fn input(title: &str, price: f64) -> PropertyInput {
    PropertyInput {
        title: Some(title.to_string()),
        price: Some(price),
        location: Some("Dehradun".to_string()),
        property_type: Some("Villa".to_string()),
        area: Some("1200 sqft".to_string()),
        description: Some("test".to_string()),
        bedrooms: Some(3),
        ..PropertyInput::default()
    }
}

async fn sqlite() -> Arc<SqliteStore> {
    let store = SqliteStore::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    store.migrate().await.expect("schema");
    Arc::new(store)
}

async fn pages_cover_every_listing_once<R>(repository: Arc<R>, total: usize)
where
    R: PropertyRepository + 'static,
{
    let service = CatalogService::new(repository);
    for n in 0..total {
        service
            .create(input(&format!("Listing {n}"), 1_000.0 + n as f64))
            .await
            .expect("created");
    }

    let first = service.list(None, 1).await.expect("first page");
    let expected_pages = total.div_ceil(PAGE_SIZE as usize) as u32;
    assert_eq!(first.pages, expected_pages);

    let mut seen = HashSet::new();
    let mut items = 0;
    for page in 1..=first.pages {
        let listed = service.list(None, page).await.expect("page");
        assert!(listed.properties.len() <= PAGE_SIZE as usize);
        for property in listed.properties {
            items += 1;
            assert!(seen.insert(property.id), "listing appeared on two pages");
        }
    }
    assert_eq!(items, total);
}

#[tokio::test]
async fn pagination_partitions_the_catalog() {
    for total in [0, 1, 10, 11, 25] {
        pages_cover_every_listing_once(Arc::new(MemoryStore::new()), total).await;
        pages_cover_every_listing_once(sqlite().await, total).await;
    }
}

async fn keyword_filters_titles<R>(repository: Arc<R>)
where
    R: PropertyRepository + 'static,
{
    let service = CatalogService::new(repository);
    for title in ["Sunrise Villa", "Hill Flat", "villa garden plot", "Lake House", "ÉLITE Villa"] {
        service.create(input(title, 10.0)).await.expect("created");
    }

    let villas = service.list(Some("Villa"), 1).await.expect("filtered");
    assert_eq!(villas.properties.len(), 3);
    assert!(villas
        .properties
        .iter()
        .all(|property| property.fields.title.to_lowercase().contains("villa")));

    let elite = service.list(Some("élite"), 1).await.expect("filtered");
    assert_eq!(elite.properties.len(), 1);
    assert_eq!(elite.properties[0].fields.title, "ÉLITE Villa");
    let elite = service.list(Some("Élite"), 1).await.expect("filtered");
    assert_eq!(elite.properties.len(), 1);

    let everything = service.list(Some(""), 1).await.expect("unfiltered");
    assert_eq!(everything.properties.len(), 5);
}

#[tokio::test]
async fn keyword_search_is_case_insensitive() {
    keyword_filters_titles(Arc::new(MemoryStore::new())).await;
    keyword_filters_titles(sqlite().await).await;
}

async fn zero_values_survive_update<R>(repository: Arc<R>)
where
    R: PropertyRepository + 'static,
{
    let service = CatalogService::new(repository);
    let created = service.create(input("Sunrise Villa", 100.0)).await.expect("created");

    let updated = service
        .update(
            &created.id.to_string(),
            PropertyInput {
                bedrooms: Some(0),
                ..PropertyInput::default()
            },
        )
        .await
        .expect("updated");

    assert_eq!(updated.fields.price, 100.0);
    assert_eq!(updated.fields.bedrooms, 0);
    let reread = service.get(&created.id.to_string()).await.expect("stored");
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn update_keeps_unsent_fields() {
    zero_values_survive_update(Arc::new(MemoryStore::new())).await;
    zero_values_survive_update(sqlite().await).await;
}

async fn second_delete_is_not_found<R>(repository: Arc<R>)
where
    R: PropertyRepository + 'static,
{
    let service = CatalogService::new(repository);
    let id = service
        .create(input("Sunrise Villa", 100.0))
        .await
        .expect("created")
        .id
        .to_string();

    service.delete(&id).await.expect("first delete");
    assert!(matches!(service.get(&id).await, Err(CatalogError::NotFound)));
    assert!(matches!(service.delete(&id).await, Err(CatalogError::NotFound)));
}

#[tokio::test]
async fn concurrent_updates_on_a_shared_database_all_land() {
    let path = std::env::temp_dir().join(format!("property-desk-{}.db", uuid::Uuid::new_v4()));
    let store = SqliteStore::connect(&format!("sqlite://{}", path.display()), 5)
        .await
        .expect("file database");
    store.migrate().await.expect("schema");
    let service = Arc::new(CatalogService::new(Arc::new(store)));
    let id = service
        .create(input("Sunrise Villa", 100.0))
        .await
        .expect("created")
        .id
        .to_string();

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..50u32 {
        let service = Arc::clone(&service);
        let id = id.clone();
        tasks.spawn(async move {
            service
                .update(
                    &id,
                    PropertyInput {
                        bedrooms: Some(n),
                        ..PropertyInput::default()
                    },
                )
                .await
        });
    }
    while let Some(outcome) = tasks.join_next().await {
        outcome.unwrap().expect("every update commits");
    }

    let stored = service.get(&id).await.expect("stored");
    assert!(stored.fields.bedrooms < 50);
    assert!(stored.updated_at >= stored.created_at);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn deleted_listings_stay_gone() {
    second_delete_is_not_found(Arc::new(MemoryStore::new())).await;
    second_delete_is_not_found(sqlite().await).await;
}
