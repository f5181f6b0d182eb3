use nexus_lib::events::{event_names, MemoryEventSink, PipelineEvent};
use nexus_lib::manager::RECOVERY_ACKNOWLEDGMENT;
use nexus_lib::pipeline::{
    Adapter, InputStage, OutputStage, PipelineStage, StageRole, TransformStage,
};
use nexus_lib::*;
use serde_json::json;

fn standard_manager() -> (NexusManager, MemoryEventSink) {
    let sink = MemoryEventSink::new();
    let manager =
        NexusManager::with_standard_pipelines(NexusConfig::default()).with_event_sink(sink.clone());
    (manager, sink)
}

fn rendered(outcome: Option<ProcessOutcome>) -> String {
    match outcome {
        Some(ProcessOutcome::Rendered(text)) => text,
        other => panic!("expected a rendering, got {:?}", other),
    }
}

/// The multi-format batch followed by a chain and a failure, end to end
#[test]
fn test_complete_multi_format_workflow() {
    let (mut manager, sink) = standard_manager();

    // Step 1: Initialization banner
    let overview = manager.announce();
    assert_eq!(overview.len(), 3);
    assert_eq!(overview[0], "Stage 1: Input validation and parsing");

    // Step 2: One record per format
    assert_eq!(
        rendered(manager.process(&json!({"sensor": "temp", "value": 23.5, "unit": "C"})).unwrap()),
        "Processed temperature reading: 23.5°C (Normal range)"
    );
    assert_eq!(
        rendered(manager.process(&json!("user,action,timestamp")).unwrap()),
        "User activity logged: 1 actions processed"
    );
    assert_eq!(
        rendered(manager.process(&json!("Real-time sensor stream")).unwrap()),
        "Stream summary: 5 readings, avg: 22.1°C"
    );

    let stats = manager.stats();
    assert_eq!(stats[&AdapterKind::Structured], 1);
    assert_eq!(stats[&AdapterKind::Delimited], 1);
    assert_eq!(stats[&AdapterKind::FreeText], 1);

    // Step 3: Chain
    let report = manager
        .run_chain(
            &PipelineChain::standard().unwrap(),
            &json!({"sensor": "temp", "value": 23.5, "unit": "C"}),
        )
        .unwrap();
    assert_eq!(report.completed_hops(), 3);
    assert_eq!(manager.stats(), stats);

    // Step 4: Error recovery
    sink.clear();
    let outcome = manager.process(&json!({"sensor": "temp"})).unwrap();
    assert_eq!(outcome.as_ref().map(|o| o.as_str()), Some("Recovery successful"));
    assert_eq!(manager.stats(), stats);

    let failed_stage = sink.events().into_iter().find_map(|e| match e {
        PipelineEvent::StageFailed { stage_index, .. } => Some(stage_index),
        _ => None,
    });
    assert_eq!(failed_stage, Some(1));
    assert!(sink.events().iter().any(|e| matches!(
        e,
        PipelineEvent::RecoveryCompleted { message, .. } if message == RECOVERY_ACKNOWLEDGMENT
    )));
}

#[test]
fn test_heat_wave_reading() {
    let (mut manager, _) = standard_manager();
    let text = rendered(
        manager
            .process(&json!({"sensor": "temp", "value": 40, "unit": "C"}))
            .unwrap(),
    );
    assert!(text.contains("Canicule range"));
    assert_eq!(text, "Processed temperature reading: 40°C (Canicule range)");
}

#[test]
fn test_bare_number_is_a_no_op() {
    let (mut manager, sink) = standard_manager();
    assert_eq!(manager.process(&json!(42)).unwrap(), None);
    assert!(sink.events().is_empty());
    assert!(manager.stats().values().all(|&c| c == 0));
}

#[test]
fn test_blank_text_is_unclassified_not_recovered() {
    let (mut manager, _) = standard_manager();
    assert_eq!(manager.process(&json!("   ")).unwrap(), None);
}

#[test]
fn test_empty_object_recovers_at_input() {
    let (mut manager, sink) = standard_manager();
    let outcome = manager.process(&json!({})).unwrap();
    assert_eq!(outcome, Some(ProcessOutcome::Recovered));
    assert_eq!(manager.count(AdapterKind::Structured), 0);
    assert!(!sink.names().contains(&event_names::PIPELINE_STAGE_COMPLETED));
}

#[test]
fn test_multiline_activity_log() {
    let (mut manager, _) = standard_manager();
    let text = rendered(
        manager
            .process(&json!("user,action,timestamp\nalice,login,100\nbob,logout,200"))
            .unwrap(),
    );
    assert_eq!(text, "User activity logged: 3 actions processed");
}

#[test]
fn test_custom_wiring_through_manager() {
    let mut manager = NexusManager::new(NexusConfig::default());
    manager.register(
        Adapter::builder(AdapterKind::Structured, "Strict A")
            .add_stage(InputStage::strict())
            .add_stage(TransformStage::new())
            .add_stage(OutputStage::new())
            .build(),
    );

    assert_eq!(
        manager.process(&json!({"value": 12})).unwrap(),
        Some(ProcessOutcome::Recovered)
    );
    assert!(matches!(
        manager.process(&json!("user,action,timestamp")),
        Err(NexusError::UnroutableInput(AdapterKind::Delimited))
    ));

    let stages: Vec<StageRole> = manager.adapters()[0].stages().map(|s| s.role()).collect();
    assert_eq!(stages, StageRole::ORDER.to_vec());
}

#[test]
fn test_pipeline_stats_serialize() {
    let (mut manager, _) = standard_manager();
    manager.process(&json!("Real-time sensor stream")).unwrap();

    let json = serde_json::to_value(manager.pipeline_stats()).unwrap();
    assert_eq!(json[2]["pipeline_id"], "Pipeline C");
    assert_eq!(json[2]["elements_processed"], 1);
}
