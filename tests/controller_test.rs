use async_trait::async_trait;
use pipecraft::config::CanvasConfig;
use pipecraft::controller::{CanvasController, LoadSource, RunOutcome};
use pipecraft::error::{CanvasError, NetworkError, ValidationError};
use pipecraft::events::CanvasEvent;
use pipecraft::factory::{DragPayload, ScreenPoint, SequentialIdGenerator, Viewport};
use pipecraft::flows;
use pipecraft::graph::{NodeKind, NodeStatus, Position};
use pipecraft::store::{InMemoryTemplateStore, TemplateRecord, TemplateStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn fast_config() -> CanvasConfig {
    CanvasConfig {
        run_step_delay_ms: 5,
        ..CanvasConfig::default()
    }
}

fn controller(store: Arc<InMemoryTemplateStore>) -> CanvasController {
    CanvasController::new(store, &fast_config())
}

/// A backend that is always down.
struct UnreachableStore;

#[async_trait]
impl TemplateStore for UnreachableStore {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
    async fn create_template(&self, _record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
    async fn update_template(&self, _id: &str, _record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
    async fn delete_template(&self, _id: &str) -> Result<(), NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
    async fn load_yaml(&self, _id: &str) -> Result<Option<String>, NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
    async fn save_yaml(&self, _id: &str, _yaml: &str) -> Result<(), NetworkError> {
        Err(NetworkError::api(503, "unavailable"))
    }
}

/// In-memory store whose YAML writes can be switched off.
struct FlakyYamlStore {
    inner: InMemoryTemplateStore,
    yaml_down: AtomicBool,
}

#[async_trait]
impl TemplateStore for FlakyYamlStore {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError> {
        self.inner.list_templates().await
    }
    async fn create_template(&self, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        self.inner.create_template(record).await
    }
    async fn update_template(&self, id: &str, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        self.inner.update_template(id, record).await
    }
    async fn delete_template(&self, id: &str) -> Result<(), NetworkError> {
        self.inner.delete_template(id).await
    }
    async fn load_yaml(&self, id: &str) -> Result<Option<String>, NetworkError> {
        self.inner.load_yaml(id).await
    }
    async fn save_yaml(&self, id: &str, yaml: &str) -> Result<(), NetworkError> {
        if self.yaml_down.load(Ordering::SeqCst) {
            return Err(NetworkError::api(500, "yaml store down"));
        }
        self.inner.save_yaml(id, yaml).await
    }
}

#[tokio::test]
async fn test_drop_connect_save_and_reload() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("X").await;

    let viewport = Viewport::default();
    let build = editor
        .drop_node(&DragPayload::new("build_jenkins"), ScreenPoint::new(100.0, 100.0), &viewport)
        .await;
    let test = editor
        .drop_node(&DragPayload::new("test_cypress"), ScreenPoint::new(350.0, 100.0), &viewport)
        .await;
    editor.connect(&build, &test).await;

    let template_id = editor.save().await.unwrap();
    assert_eq!(editor.template_id().await.as_deref(), Some(template_id.as_str()));
    assert_eq!(store.record(&template_id).unwrap().name, "X");

    let reopened = controller(store.clone());
    assert_eq!(reopened.load(&template_id).await, LoadSource::Stored);

    let graph = reopened.graph().await;
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.nodes[0].kind, NodeKind::BuildJenkins);
    assert_eq!(graph.nodes[0].position, Position::new(100.0, 100.0));
    assert_eq!(graph.edges[0].source, build);
    assert_eq!(graph.edges[0].target, test);
    assert_eq!(reopened.metadata().await.name, "X");
}

#[tokio::test]
async fn test_second_save_updates_same_record() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("first").await;

    let id = editor.save().await.unwrap();
    let created = store.record(&id).unwrap().creation_date;

    editor.set_name("renamed").await;
    assert_eq!(editor.save().await.unwrap(), id);

    let record = store.record(&id).unwrap();
    assert_eq!(record.name, "renamed");
    assert_eq!(record.creation_date, created);
    assert_eq!(store.list_templates().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_creates_record_when_listing_missing() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    let (graph, metadata) = flows::builtin_flow(flows::GATED_RELEASE).unwrap();
    editor.open(graph, metadata, Some("legacy-7".to_string())).await;

    assert_eq!(editor.save().await.unwrap(), "legacy-7");
    assert_eq!(store.record("legacy-7").unwrap().name, "Gated Release");
    assert!(store.load_yaml("legacy-7").await.unwrap().is_some());
}

#[tokio::test]
async fn test_save_as_mints_new_id() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("original").await;
    let first = editor.save().await.unwrap();

    let second = editor.save_as().await.unwrap();
    assert_ne!(first, second);
    assert_eq!(editor.template_id().await, Some(second));
    assert_eq!(store.list_templates().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_save_rejects_empty_name() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("   ").await;

    let err = editor.save().await.unwrap_err();
    assert!(matches!(err, CanvasError::Validation(ValidationError::MissingField("template name"))));
    assert!(store.list_templates().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_yaml_falls_back_to_builtin_flow() {
    let store = Arc::new(InMemoryTemplateStore::new());
    store.insert_yaml(flows::JAVA_SERVICE, "nodes: [ {id: broken");
    let editor = controller(store);

    assert_eq!(editor.load(flows::JAVA_SERVICE).await, LoadSource::BuiltIn);

    let (expected, metadata) = flows::builtin_flow(flows::JAVA_SERVICE).unwrap();
    assert_eq!(editor.graph().await, expected);
    assert_eq!(editor.metadata().await, metadata);
    assert_eq!(editor.template_id().await.as_deref(), Some(flows::JAVA_SERVICE));
}

#[tokio::test]
async fn test_unreachable_store_degrades() {
    let editor = CanvasController::new(Arc::new(UnreachableStore), &fast_config());

    assert_eq!(editor.load(flows::WEB_FRONTEND).await, LoadSource::BuiltIn);
    assert_eq!(editor.load("nobody-knows").await, LoadSource::Empty);
    assert!(editor.graph().await.is_empty());
    assert!(editor.list_templates().await.is_empty());

    editor.set_name("offline").await;
    assert!(matches!(editor.save().await, Err(CanvasError::Network(_))));
}

#[tokio::test]
async fn test_copy_from_template() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("Base").await;
    editor
        .drop_node(&DragPayload::new("code_github"), ScreenPoint::new(0.0, 0.0), &Viewport::default())
        .await;
    let id = editor.save().await.unwrap();

    editor.copy_from_template(&id).await.unwrap();
    assert_eq!(editor.metadata().await.name, "Base (Copy)");
    assert_eq!(editor.template_id().await, None);
    assert_eq!(editor.graph().await.nodes.len(), 1);

    editor.copy_from_template(flows::WEB_FRONTEND).await.unwrap();
    assert_eq!(editor.metadata().await.name, "Web Frontend (Copy)");

    assert!(matches!(
        editor.copy_from_template("missing").await,
        Err(CanvasError::NotFound(id)) if id == "missing"
    ));
}

#[tokio::test]
async fn test_delete_template_clears_current_id() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store.clone());
    editor.new_pipeline("doomed").await;
    let id = editor.save().await.unwrap();

    editor.delete_template(&id).await.unwrap();
    assert_eq!(editor.template_id().await, None);
    assert!(store.record(&id).is_none());
    assert!(editor.delete_template(&id).await.is_err());
}

#[tokio::test]
async fn test_delete_node_removes_incident_edges() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store);
    let (graph, metadata) = flows::builtin_flow(flows::WEB_FRONTEND).unwrap();
    editor.open(graph, metadata, None).await;

    assert!(editor.delete_node("build").await);
    let graph = editor.graph().await;
    assert_eq!(graph.nodes.len(), 4);
    assert!(graph.edges.iter().all(|e| e.source != "build" && e.target != "build"));
    assert!(graph.validate().is_empty());
    assert!(!editor.delete_node("build").await);
}

#[tokio::test]
async fn test_cycle_status_and_format_canvas() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store);
    editor.new_pipeline("layout").await;
    let mut events = editor.events().subscribe();

    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(
            editor
                .drop_node(&DragPayload::new("node_dev"), ScreenPoint::new(i as f64 * 13.0, 7.0), &Viewport::default())
                .await,
        );
    }

    assert_eq!(editor.cycle_status(&ids[0]).await, Some(NodeStatus::Running));
    assert_eq!(editor.cycle_status(&ids[0]).await, Some(NodeStatus::Completed));
    assert_eq!(editor.cycle_status("ghost").await, None);

    editor.format_canvas().await;
    let graph = editor.graph().await;
    assert_eq!(graph.nodes[0].position, Position::new(300.0, 100.0));
    assert_eq!(graph.nodes[3].position, Position::new(300.0, 250.0));

    let mut saw_fit = false;
    while let Ok(event) = events.try_recv() {
        if event == CanvasEvent::FitView {
            saw_fit = true;
        }
    }
    assert!(saw_fit);
}

#[tokio::test]
async fn test_run_completes_nodes_in_order() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store);
    let (graph, metadata) = flows::builtin_flow(flows::WEB_FRONTEND).unwrap();
    editor.open(graph, metadata, None).await;
    let mut events = editor.events().subscribe();

    let outcome = editor.run().await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            visited: vec!["code", "build", "unit", "deploy", "e2e"].into_iter().map(String::from).collect()
        }
    );
    assert!(!editor.is_running());
    assert!(editor.graph().await.nodes.iter().all(|n| n.status == NodeStatus::Completed));

    let mut running_order = Vec::new();
    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        match event {
            CanvasEvent::NodeStatusChanged { node_id, status: NodeStatus::Running } => running_order.push(node_id),
            CanvasEvent::RunFinished => finished = true,
            _ => {}
        }
    }
    assert_eq!(running_order, vec!["code", "build", "unit", "deploy", "e2e"]);
    assert!(finished);
}

#[tokio::test]
async fn test_second_run_is_ignored_while_running() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = controller(store);
    let (graph, metadata) = flows::builtin_flow(flows::JAVA_SERVICE).unwrap();
    editor.open(graph, metadata, None).await;

    let (first, second) = tokio::join!(editor.run(), editor.run());
    assert!(matches!(first, RunOutcome::Completed { .. }));
    assert_eq!(second, RunOutcome::AlreadyRunning);

    // Flag is released afterwards
    assert!(matches!(editor.run().await, RunOutcome::Completed { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_drops_keep_every_node() {
    let store = Arc::new(InMemoryTemplateStore::new());
    let editor = Arc::new(CanvasController::with_id_generator(
        store,
        &fast_config(),
        Arc::new(SequentialIdGenerator::new("drop")),
    ));
    editor.new_pipeline("busy").await;

    let mut handles = Vec::new();
    for t in 0..10 {
        let editor = editor.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                editor
                    .drop_node(&DragPayload::new("test_jest"), ScreenPoint::new(t as f64, i as f64), &Viewport::default())
                    .await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let graph = editor.graph().await;
    assert_eq!(graph.nodes.len(), 200);
    assert!(graph.validate().is_empty());
}

#[tokio::test]
async fn test_failed_first_save_retries_into_same_record() {
    let store = Arc::new(FlakyYamlStore {
        inner: InMemoryTemplateStore::new(),
        yaml_down: AtomicBool::new(true),
    });
    let editor = CanvasController::new(store.clone(), &fast_config());
    editor.new_pipeline("X").await;

    assert!(matches!(editor.save().await, Err(CanvasError::Network(_))));
    let created = editor.template_id().await.expect("record id adopted after create");
    assert_eq!(store.list_templates().await.unwrap().len(), 1);

    store.yaml_down.store(false, Ordering::SeqCst);
    assert_eq!(editor.save().await.unwrap(), created);

    let records = store.list_templates().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, created);
    assert!(store.load_yaml(&created).await.unwrap().is_some());
}
