//! End-to-end migration tests over the engine with fake collaborators.

mod helpers;

use std::sync::Arc;

use helpers::TestApp;
use migrator_core::config::FileConfigProvider;
use migrator_core::context::ExecutionContext;
use migrator_core::error::ErrorKind;
use migrator_core::types::{DestinationLocation, SourceLocation, SourceStructure};
use migrator_engine::keys;
use migrator_engine::stages::{CreateAdapterStage, CreateMigrationPlanStage, LoadConfigStage};
use migrator_engine::testing::{
    ClientCall, FakeAdapter, FakeClientFactory, FakeDestinationClient, MemoryMappingSink,
    Notification, RecordingInteraction, sample_asset, sample_structure,
};
use migrator_engine::{MigratorDependencies, Pipeline, PipelineOutcome, PipelineState};
use migrator_storage::AdapterFactory;

#[tokio::test]
async fn test_plan_from_fake_adapter() {
    let app = TestApp::new(
        FakeAdapter::new(sample_structure()),
        FakeDestinationClient::new(),
        "y",
    );
    let mut pipeline = Pipeline::new(app.interaction.clone())
        .with_stage(LoadConfigStage::new(app.deps.config.clone()))
        .with_stage(CreateAdapterStage::new(app.deps.adapters.clone()))
        .with_stage(CreateMigrationPlanStage::new(
            app.interaction.clone(),
            "migrated_urls.txt",
        ));
    let mut ctx = ExecutionContext::new();

    let outcome = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Completed);

    let plan = ctx.get(keys::MIGRATION_PLAN).unwrap();
    assert_eq!(plan.category_count(), 1);
    assert_eq!(plan.folder_count(), 2);
    assert_eq!(plan.asset_count(), 1);

    let summary = app
        .interaction
        .notifications()
        .into_iter()
        .find_map(|n| match n {
            Notification::Info(message) => Some(message),
            _ => None,
        })
        .unwrap();
    assert!(summary.contains(
        "1 category will be created: Category\n- 2 folders will be created\n- 1 file will be copied\n"
    ));
}

#[tokio::test]
async fn test_full_migration() {
    let mut structure = sample_structure();
    structure.assets.push(sample_asset(
        "a-2",
        "child",
        SourceLocation::folder("c-1", "f-2"),
    ));
    let app = TestApp::new(FakeAdapter::new(structure), FakeDestinationClient::new(), "Y");
    let mut pipeline = app.deps.migration_pipeline(false);

    let outcome = pipeline.run(&mut ExecutionContext::new()).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Completed);
    assert_eq!(pipeline.state(), PipelineState::Completed);

    let uploads: Vec<(String, DestinationLocation)> = app
        .client
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ClientCall::UploadAsset { name, location, .. } => Some((name, location)),
            _ => None,
        })
        .collect();
    assert_eq!(
        uploads,
        vec![
            (
                "logo.png".to_string(),
                DestinationLocation::CategoryId("category-1".to_string())
            ),
            (
                "child.png".to_string(),
                DestinationLocation::FolderId("folder-2".to_string())
            ),
        ]
    );
    assert_eq!(
        app.mapping.lines(),
        vec![
            (
                "https://old.example.com/a-1".to_string(),
                "https://cdn.example.com/asset-1/logo.png".to_string()
            ),
            (
                "https://old.example.com/a-2".to_string(),
                "https://cdn.example.com/asset-2/child.png".to_string()
            ),
        ]
    );

    let notifications = app.interaction.notifications();
    assert!(notifications.contains(&Notification::Succeed("Assets migrated".to_string())));
    assert!(!notifications.iter().any(|n| matches!(n, Notification::Fail(_))));
}

#[tokio::test]
async fn test_dry_run_stops_before_migration() {
    let app = TestApp::new(
        FakeAdapter::new(sample_structure()),
        FakeDestinationClient::new(),
        "y",
    );
    let mut pipeline = app.deps.migration_pipeline(true);

    let outcome = pipeline.run(&mut ExecutionContext::new()).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Aborted);
    assert!(app.client.calls().is_empty());
    assert!(app.mapping.lines().is_empty());

    let notifications = app.interaction.notifications();
    assert!(!notifications.iter().any(|n| matches!(n, Notification::Prompt(_))));
    assert_eq!(
        &notifications[notifications.len() - 2..],
        &[
            Notification::Warn("Dry run enabled, migration will not be started".to_string()),
            Notification::Warn("Migration aborted".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_declined_confirmation() {
    let app = TestApp::new(
        FakeAdapter::new(sample_structure()),
        FakeDestinationClient::new(),
        "n",
    );

    let outcome = app
        .deps
        .migration_pipeline(false)
        .run(&mut ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::Aborted);
    assert!(app.client.calls().is_empty());
}

#[tokio::test]
async fn test_failed_asset_fails_the_run_after_all_attempts() {
    let structure = SourceStructure {
        categories: sample_structure().categories,
        assets: vec![
            sample_asset("a-1", "one", SourceLocation::category_root("c-1")),
            sample_asset("a-2", "two", SourceLocation::category_root("c-1")),
            sample_asset("a-3", "three", SourceLocation::folder("c-1", "f-1")),
        ],
    };
    let app = TestApp::new(
        FakeAdapter::new(structure),
        FakeDestinationClient::new().failing_upload("two.png"),
        "y",
    );
    let mut pipeline = app.deps.migration_pipeline(false);

    let err = pipeline.run(&mut ExecutionContext::new()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Transfer);
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(app.adapter.downloads().len(), 3);
    assert_eq!(app.mapping.lines().len(), 2);
    assert_eq!(
        app.interaction.notifications().last(),
        Some(&Notification::Fail("Assets migration failed".to_string()))
    );
    assert!(
        app.interaction
            .progress_messages()
            .contains(&"Copying assets: 66% (processing file 3 of 3)".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_source_stops_before_destination_writes() {
    let app = TestApp::new(
        FakeAdapter::new(sample_structure()).unreachable(),
        FakeDestinationClient::new(),
        "y",
    );
    let mut pipeline = app.deps.migration_pipeline(false);

    let err = pipeline.run(&mut ExecutionContext::new()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connection);
    assert!(app.client.calls().is_empty());
    assert!(app.interaction.notifications().contains(&Notification::Fail(
        "Connection to source storage verification failed".to_string()
    )));
}

#[tokio::test]
async fn test_local_adapter_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("storage");
    std::fs::create_dir_all(root.join("images/2024")).unwrap();
    std::fs::write(root.join("images/logo.png"), b"logo").unwrap();
    std::fs::write(root.join("images/2024/beach.jpg"), b"beach").unwrap();

    let config_path = dir.path().join("config.json");
    let config = config_json(&root.display().to_string());
    std::fs::write(&config_path, config).unwrap();

    let interaction = Arc::new(RecordingInteraction::new().with_answer("y"));
    let client = Arc::new(FakeDestinationClient::new());
    let mapping = Arc::new(MemoryMappingSink::new());
    let deps = MigratorDependencies {
        config: Arc::new(FileConfigProvider::new(&config_path)),
        adapters: AdapterFactory::with_defaults(),
        clients: Arc::new(FakeClientFactory::new(client.clone())),
        interaction: interaction.clone(),
        mapping: mapping.clone(),
    };

    let outcome = deps
        .migration_pipeline(false)
        .run(&mut ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::Completed);
    assert_eq!(
        client.calls()[..2],
        [
            ClientCall::CreateCategory(migrator_core::types::NewCategory {
                name: "images".to_string(),
                allowed_extensions: ["jpg".to_string(), "png".to_string()].into(),
            }),
            ClientCall::CreateFolder(migrator_core::types::NewFolder {
                name: "2024".to_string(),
                location: DestinationLocation::CategoryId("category-1".to_string()),
            }),
        ]
    );
    assert_eq!(
        mapping.lines(),
        vec![
            (
                "https://files.example.com/images/2024/beach.jpg".to_string(),
                "https://cdn.example.com/asset-1/beach.jpg".to_string()
            ),
            (
                "https://files.example.com/images/logo.png".to_string(),
                "https://cdn.example.com/asset-2/logo.png".to_string()
            ),
        ]
    );
}

fn config_json(root: &str) -> String {
    format!(
        r#"{{
            "source": {{
                "type": "local",
                "options": {{
                    "root_path": {root:?},
                    "public_url": "https://files.example.com/",
                    "allowed_extensions": {{ "images": ["png", "jpg"] }}
                }}
            }},
            "destination": {{
                "service_origin": "https://assets.example.com",
                "access_token": "token"
            }}
        }}"#
    )
}
