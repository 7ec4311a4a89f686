use super::*;

#[tokio::test]
async fn get_is_type_checked() {
    let client = InMemoryEntityClient::new("jdoe");
    let project = client.seed_project("demo");

    assert!(client.get("Project", &project).await.unwrap().is_some());
    assert!(client.get("Task", &project).await.unwrap().is_none());
}

#[tokio::test]
async fn query_supports_and_joined_dotted_paths() {
    let client = InMemoryEntityClient::new("jdoe");
    let project = client.seed_project("demo");
    let shot = client.seed_context(&project, "shot010");
    let other = client.seed_context(&project, "shot020");
    client.seed_asset(&shot, "hero", "geo");
    client.seed_asset(&other, "hero", "geo");

    let hits = client
        .query(&format!(
            "Asset where name is \"hero\" and parent.id is \"{shot}\""
        ))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].str_field("parent_id"), Some(shot.as_str()));
}

#[tokio::test]
async fn malformed_query_is_an_error() {
    let client = InMemoryEntityClient::new("jdoe");
    assert!(client.query("Asset").await.is_err());
    assert!(client.query("Asset where name").await.is_err());
    assert!(client.query("Asset where name is hero").await.is_err());
}

#[tokio::test]
async fn version_numbers_are_monotonic_per_asset() {
    let client = InMemoryEntityClient::new("jdoe");
    let project = client.seed_project("demo");
    let shot = client.seed_context(&project, "shot010");
    let asset_a = client.seed_asset(&shot, "a", "geo");
    let asset_b = client.seed_asset(&shot, "b", "geo");

    let make = |asset: String| {
        let client = &client;
        async move {
            let mut fields = serde_json::Map::new();
            fields.insert("asset_id".to_string(), json!(asset));
            client.create("AssetVersion", fields).await.unwrap()
        }
    };

    let v1 = make(asset_a.clone()).await;
    let v2 = make(asset_a.clone()).await;
    let other = make(asset_b).await;
    assert_eq!(v1.i64_field("version"), Some(1));
    assert_eq!(v2.i64_field("version"), Some(2));
    assert_eq!(other.i64_field("version"), Some(1));
}

#[tokio::test]
async fn component_file_type_strips_range_suffix() {
    let client = InMemoryEntityClient::new("jdoe");
    let comp = client
        .create_component(
            "version-1",
            "/out/beauty.%04d.exr [1001-1096]",
            "beauty",
            &shotlink_core::domain::Metadata::new(),
        )
        .await
        .unwrap();
    assert_eq!(comp.str_field("file_type"), Some(".exr"));
}

#[tokio::test]
async fn mutation_counter_tracks_every_write_verb() {
    let client = InMemoryEntityClient::new("jdoe");
    assert_eq!(client.mutation_count(), 0);

    client
        .create("Project", serde_json::Map::new())
        .await
        .unwrap();
    client.commit().await.unwrap();
    client.encode_media("v", "/x.mp4").await.unwrap();
    assert_eq!(client.mutation_count(), 3);
    assert_eq!(client.commit_count(), 1);
    assert_eq!(client.encoded_media().len(), 1);
}

#[tokio::test]
async fn seed_document_builds_hierarchy_with_explicit_ids() {
    let client = InMemoryEntityClient::new("jdoe");
    client
        .load_seed(
            r#"{
                "projects": [{
                    "name": "demo",
                    "contexts": [{
                        "name": "shot010",
                        "tasks": [{"id": "task-anim", "name": "anim"}],
                        "assets": [{"name": "hero", "type": "geo"}]
                    }]
                }]
            }"#,
        )
        .unwrap();

    let task = client.get("Task", "task-anim").await.unwrap().unwrap();
    let parent = task.str_field("parent_id").unwrap().to_string();
    let ctx = client.get("Context", &parent).await.unwrap().unwrap();
    assert_eq!(ctx.str_field("name"), Some("shot010"));
    assert_eq!(client.entities_of_type("Asset").len(), 1);
}

#[tokio::test]
async fn duplicate_seed_id_is_rejected() {
    let client = InMemoryEntityClient::new("jdoe");
    let seed = r#"{
        "projects": [
            {"id": "p1", "name": "a"},
            {"id": "p1", "name": "b"}
        ]
    }"#;
    assert!(matches!(
        client.load_seed(seed),
        Err(SeedError::DuplicateId(_))
    ));
}

#[tokio::test]
async fn api_principal_is_queryable_as_user() {
    let client = InMemoryEntityClient::new("jdoe");
    let users = client
        .query("User where username is \"jdoe\"")
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}
