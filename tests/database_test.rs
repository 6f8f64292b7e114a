//! Record store tests
//!
//! Migrations, services and read models against a temp-file SQLite database

use std::io::Cursor;

use anyhow::Result;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use landscape::app_context::AppContext;
use landscape::config::RegistryConfig;
use landscape::database::entities::{dataflows, systems};
use landscape::database::{establish_connection, get_database_url, setup_database};
use landscape::errors::{RegistryError, RegistryErrorKind};
use landscape::model::SystemStatus;
use landscape::services::query::SystemQuery;
use landscape::services::validation::{DataFlowInput, OwnerInput, SystemInput, TechnicalSpecInput};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let path = temp_file.path().display().to_string();

    let db = establish_connection(&get_database_url(Some(&path))).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

fn system_input(code: &str) -> SystemInput {
    SystemInput {
        name: format!("System {}", code),
        code: code.to_string(),
        description: format!("Description of {}", code),
        status: Some("production".to_string()),
        owner: Some(OwnerInput {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            department: "Finance".to_string(),
            phone: None,
        }),
        technical_spec: TechnicalSpecInput {
            technology_stack: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn flow_input(source: Uuid, target: Uuid) -> DataFlowInput {
    DataFlowInput {
        source_system_id: Some(source.to_string()),
        target_system_id: Some(target.to_string()),
        data_objects: vec!["Invoice".to_string()],
        integration_technology: Some("REST API".to_string()),
        ..Default::default()
    }
}

fn kind_of<T: std::fmt::Debug>(result: Result<T, RegistryError>) -> RegistryErrorKind {
    match result {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(err) => err.kind(),
    }
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let systems = systems::Entity::find().all(&db).await?;
    assert_eq!(systems.len(), 0);

    let flows = dataflows::Entity::find().all(&db).await?;
    assert_eq!(flows.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_system_create_and_get() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let created = ctx.create_system(&system_input("SYS-1")).await?;
    assert_eq!(created.version, "1.0.0");
    assert_eq!(created.status, SystemStatus::Production);

    let detail = ctx.get_system(created.id).await?;
    assert_eq!(detail.system.code, "SYS-1");
    assert_eq!(detail.system.owner.email, "ada@example.com");
    assert_eq!(
        detail.system.technical_spec.technology_stack,
        vec!["Rust", "PostgreSQL"]
    );
    assert!(detail.dataflows.is_empty());

    assert_eq!(
        kind_of(ctx.get_system(Uuid::new_v4()).await),
        RegistryErrorKind::NotFound
    );

    Ok(())
}

#[tokio::test]
async fn test_duplicate_code_is_rejected() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db.clone());

    ctx.create_system(&system_input("SYS-1")).await?;
    let err = ctx
        .create_system(&system_input("SYS-1"))
        .await
        .expect_err("duplicate code must fail");
    assert_eq!(err.kind(), RegistryErrorKind::Integrity);
    assert!(err.fields().is_some_and(|fields| fields.contains("code")));

    assert_eq!(systems::Entity::find().count(&db).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_update_keeps_identity_and_checks_code() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let first = ctx.create_system(&system_input("SYS-1")).await?;
    ctx.create_system(&system_input("SYS-2")).await?;

    let mut input = system_input("SYS-1");
    input.name = "Renamed".to_string();
    let updated = ctx.update_system(first.id, &input).await?;
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.created_at, first.created_at);

    let clash = ctx.update_system(first.id, &system_input("SYS-2")).await;
    assert_eq!(kind_of(clash), RegistryErrorKind::Integrity);

    let missing = ctx.update_system(Uuid::new_v4(), &system_input("SYS-9")).await;
    assert_eq!(kind_of(missing), RegistryErrorKind::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_dataflow_requires_existing_distinct_endpoints() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db.clone());

    let a = ctx.create_system(&system_input("SYS-A")).await?;

    let dangling = ctx.create_dataflow(&flow_input(a.id, Uuid::new_v4())).await;
    assert_eq!(kind_of(dangling), RegistryErrorKind::Integrity);

    let self_loop = ctx.create_dataflow(&flow_input(a.id, a.id)).await;
    assert_eq!(kind_of(self_loop), RegistryErrorKind::Validation);

    assert_eq!(dataflows::Entity::find().count(&db).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_dataflow_crud_and_filter() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let a = ctx.create_system(&system_input("SYS-A")).await?;
    let b = ctx.create_system(&system_input("SYS-B")).await?;
    let c = ctx.create_system(&system_input("SYS-C")).await?;

    let ab = ctx.create_dataflow(&flow_input(a.id, b.id)).await?;
    let bc = ctx.create_dataflow(&flow_input(b.id, c.id)).await?;
    assert_eq!(ab.frequency.as_str(), "real-time");

    let for_a = ctx.list_dataflows(Some(a.id)).await?;
    assert_eq!(for_a.iter().map(|f| f.id).collect::<Vec<_>>(), vec![ab.id]);
    let for_b = ctx.list_dataflows(Some(b.id)).await?;
    assert_eq!(for_b.len(), 2);
    assert_eq!(ctx.list_dataflows(None).await?.len(), 2);
    assert_eq!(
        kind_of(ctx.list_dataflows(Some(Uuid::new_v4())).await),
        RegistryErrorKind::NotFound
    );

    let mut input = flow_input(c.id, a.id);
    input.frequency = Some("batch".to_string());
    let moved = ctx.update_dataflow(bc.id, &input).await?;
    assert_eq!(moved.source_system_id, c.id);
    assert_eq!(ctx.get_dataflow(bc.id).await?.frequency.as_str(), "batch");

    let detail = ctx.get_system(a.id).await?;
    assert_eq!(detail.dataflows.len(), 2);

    ctx.delete_dataflow(ab.id).await?;
    assert_eq!(
        kind_of(ctx.delete_dataflow(ab.id).await),
        RegistryErrorKind::NotFound
    );

    Ok(())
}

#[tokio::test]
async fn test_dataflow_update_checks_endpoints() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let a = ctx.create_system(&system_input("SYS-A")).await?;
    let b = ctx.create_system(&system_input("SYS-B")).await?;
    let flow = ctx.create_dataflow(&flow_input(a.id, b.id)).await?;

    let err = ctx
        .update_dataflow(flow.id, &flow_input(b.id, b.id))
        .await
        .expect_err("self-loop must be rejected");
    assert_eq!(err.kind(), RegistryErrorKind::Validation);
    assert!(err
        .fields()
        .is_some_and(|fields| fields.contains("target_system_id")));

    let err = ctx
        .update_dataflow(flow.id, &flow_input(a.id, Uuid::new_v4()))
        .await
        .expect_err("unknown target must be rejected");
    assert_eq!(err.kind(), RegistryErrorKind::Integrity);
    assert!(err
        .fields()
        .is_some_and(|fields| fields.contains("target_system_id")));

    let stored = ctx.get_dataflow(flow.id).await?;
    assert_eq!(stored.source_system_id, a.id);
    assert_eq!(stored.target_system_id, b.id);
    assert_eq!(stored.updated_at, flow.updated_at);

    Ok(())
}

#[tokio::test]
async fn test_department_statistics_agree_with_filter() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    for (code, department) in [
        ("SYS-1", "Finance"),
        ("SYS-2", "finance"),
        ("SYS-3", "Équipe"),
        ("SYS-4", "équipe"),
    ] {
        let mut input = system_input(code);
        if let Some(owner) = input.owner.as_mut() {
            owner.department = department.to_string();
        }
        ctx.create_system(&input).await?;
    }

    let stats = ctx.statistics().await?;
    assert_eq!(stats.systems_by_department.len(), 2);

    for (bucket, count) in &stats.systems_by_department {
        let query = SystemQuery {
            department: Some(bucket.to_lowercase()),
            ..Default::default()
        };
        let page = ctx.list_systems(&query).await?;
        assert_eq!(page.pagination.total_count, *count);
        assert_eq!(*count, 2);
    }

    Ok(())
}

#[tokio::test]
async fn test_status_change_on_missing_system() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let system = ctx.create_system(&system_input("SYS-1")).await?;
    ctx.delete_system(system.id).await?;

    assert_eq!(
        kind_of(ctx.deprecate_system(system.id).await),
        RegistryErrorKind::NotFound
    );
    assert_eq!(
        kind_of(ctx.activate_system(system.id).await),
        RegistryErrorKind::NotFound
    );

    Ok(())
}

#[tokio::test]
async fn test_delete_blocked_while_referenced() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let a = ctx.create_system(&system_input("SYS-A")).await?;
    let b = ctx.create_system(&system_input("SYS-B")).await?;
    let flow = ctx.create_dataflow(&flow_input(a.id, b.id)).await?;

    let mut dependent = system_input("SYS-D");
    dependent.dependent_systems = vec![a.id.to_string()];
    let d = ctx.create_system(&dependent).await?;

    assert_eq!(
        kind_of(ctx.delete_system(a.id).await),
        RegistryErrorKind::Integrity
    );

    ctx.delete_dataflow(flow.id).await?;
    ctx.delete_system(a.id).await?;

    assert_eq!(
        kind_of(ctx.get_system(a.id).await),
        RegistryErrorKind::NotFound
    );
    let d = ctx.get_system(d.id).await?;
    assert!(d.system.dependent_systems.is_empty());

    assert_eq!(
        kind_of(ctx.delete_system(a.id).await),
        RegistryErrorKind::NotFound
    );

    Ok(())
}

#[tokio::test]
async fn test_hierarchy_and_cycle_rejection() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let root = ctx.create_system(&system_input("ROOT")).await?;
    let mut mid_input = system_input("MID");
    mid_input.parent_system_id = Some(root.id.to_string());
    let mid = ctx.create_system(&mid_input).await?;
    let mut leaf_input = system_input("LEAF");
    leaf_input.parent_system_id = Some(mid.id.to_string());
    let leaf = ctx.create_system(&leaf_input).await?;

    let hierarchy = ctx.system_hierarchy(leaf.id).await?;
    let ancestors: Vec<_> = hierarchy.ancestors.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(ancestors, vec!["MID", "ROOT"]);
    assert!(hierarchy.children.is_empty());

    let hierarchy = ctx.system_hierarchy(root.id).await?;
    assert_eq!(hierarchy.children.len(), 1);
    assert_eq!(hierarchy.children[0].id, mid.id);

    let mut cyclic = system_input("ROOT");
    cyclic.parent_system_id = Some(leaf.id.to_string());
    let err = ctx
        .update_system(root.id, &cyclic)
        .await
        .expect_err("cycle must be rejected");
    assert_eq!(err.kind(), RegistryErrorKind::Integrity);
    assert!(err
        .fields()
        .is_some_and(|fields| fields.contains("parent_system_id")));

    // parents cannot be deleted while children point at them
    assert_eq!(
        kind_of(ctx.delete_system(root.id).await),
        RegistryErrorKind::Integrity
    );

    Ok(())
}

#[tokio::test]
async fn test_status_transitions() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let mut input = system_input("SYS-1");
    input.status = Some("planned".to_string());
    let created = ctx.create_system(&input).await?;
    assert_eq!(created.status, SystemStatus::Development);

    let active = ctx.activate_system(created.id).await?;
    assert_eq!(active.status, SystemStatus::Production);

    let again = ctx.activate_system(created.id).await?;
    assert_eq!(again.updated_at, active.updated_at);

    let deprecated = ctx.deprecate_system(created.id).await?;
    assert_eq!(deprecated.status, SystemStatus::Deprecated);
    assert_eq!(
        ctx.get_system(created.id).await?.system.status,
        SystemStatus::Deprecated
    );

    Ok(())
}

#[tokio::test]
async fn test_statistics_and_diagram_example() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let a = ctx.create_system(&system_input("SYS-1")).await?;
    let b = ctx.create_system(&system_input("SYS-2")).await?;
    let mut c_input = system_input("SYS-3");
    c_input.status = Some("deprecated".to_string());
    c_input.criticality_class = Some("Mission critical".to_string());
    ctx.create_system(&c_input).await?;
    ctx.create_dataflow(&flow_input(a.id, b.id)).await?;

    let stats = ctx.statistics().await?;
    assert_eq!(stats.total_systems, 3);
    assert_eq!(
        stats.development_systems + stats.production_systems + stats.deprecated_systems,
        3
    );
    assert_eq!(stats.critical_systems, 1);
    assert_eq!(stats.top_technologies[0].count, 3);

    let diagram = ctx.dataflow_diagram().await?;
    assert_eq!(diagram.metadata.total_systems, 3);
    assert_eq!(diagram.metadata.total_dataflows, 1);
    assert_eq!(diagram.metadata.connected_systems, 2);
    assert_eq!(diagram.metadata.isolated_systems, 1);

    Ok(())
}

#[tokio::test]
async fn test_list_pages_production_systems() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    for i in 0..5 {
        ctx.create_system(&system_input(&format!("PROD-{}", i))).await?;
    }
    let mut dev = system_input("DEV-1");
    dev.status = Some("development".to_string());
    ctx.create_system(&dev).await?;

    let query = SystemQuery {
        status: Some("production".to_string()),
        page: Some(1),
        page_size: Some(2),
        ..Default::default()
    };
    let first = ctx.list_systems(&query).await?;
    assert_eq!(first.systems.len(), 2);
    assert_eq!(first.pagination.total_count, 5);
    assert_eq!(first.pagination.total_pages, 3);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let query = SystemQuery {
            page: Some(page),
            ..query.clone()
        };
        seen.extend(ctx.list_systems(&query).await?.systems.into_iter().map(|s| s.id));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);

    let search = SystemQuery {
        q: Some("prod-3".to_string()),
        ..Default::default()
    };
    let found = ctx.list_systems(&search).await?;
    assert_eq!(found.pagination.total_count, 1);
    assert_eq!(found.systems[0].code, "PROD-3");

    Ok(())
}

#[tokio::test]
async fn test_export_reads_back() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let ctx = AppContext::new(db);

    let a = ctx.create_system(&system_input("SYS-1")).await?;
    let b = ctx.create_system(&system_input("SYS-2")).await?;
    ctx.create_dataflow(&flow_input(a.id, b.id)).await?;

    let export = ctx.export_systems(&SystemQuery::default()).await?;
    assert!(export.filename.starts_with("information_systems_export_"));
    assert!(export.filename.ends_with(".xlsx"));
    assert_eq!(export.rows, 2);

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(export.bytes))?;
    let range = workbook.worksheet_range("Information Systems")?;
    assert_eq!(range.height(), 3);
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("ID".to_string())));
    assert_eq!(range.get_value((1, 2)), Some(&Data::String("SYS-1".to_string())));
    assert_eq!(range.get_value((1, 26)), Some(&Data::Float(1.0)));
    assert_eq!(
        range.get_value((1, 27)),
        Some(&Data::String("SYS-1→SYS-2: Invoice via REST API".to_string()))
    );

    Ok(())
}

#[tokio::test]
async fn test_export_row_limit() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let mut config = RegistryConfig::default();
    config.export.max_rows = 1;
    let ctx = AppContext::from_config(db, &config);

    ctx.create_system(&system_input("SYS-1")).await?;
    ctx.create_system(&system_input("SYS-2")).await?;

    let err = ctx
        .export_systems(&SystemQuery::default())
        .await
        .expect_err("export over the limit must fail");
    assert_eq!(err.kind(), RegistryErrorKind::Validation);
    assert!(err.fields().is_some_and(|fields| fields.contains("filters")));

    // free-text filters are counted in memory before anything is rendered
    let text_filtered = SystemQuery {
        q: Some("sys".to_string()),
        ..Default::default()
    };
    assert_eq!(
        kind_of(ctx.export_systems(&text_filtered).await),
        RegistryErrorKind::Validation
    );

    let narrowed = SystemQuery {
        q: Some("SYS-2".to_string()),
        ..Default::default()
    };
    assert_eq!(ctx.export_systems(&narrowed).await?.rows, 1);

    let store_filtered = SystemQuery {
        status: Some("production".to_string()),
        ..Default::default()
    };
    assert_eq!(
        kind_of(ctx.export_systems(&store_filtered).await),
        RegistryErrorKind::Validation
    );

    Ok(())
}
