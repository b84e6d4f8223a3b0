//! Interaction log persistence against a real filesystem.

use insight_common::{Agent, AgentConfig, Interaction};
use insightctl::memory_store;
use std::fs;
use tempfile::TempDir;

fn interaction(n: usize) -> Interaction {
    Interaction::new(
        format!("question {}", n),
        format!("answer {}", n),
        0.8,
        vec![format!("source {}", n)],
        vec![],
    )
}

#[test]
fn test_missing_file_is_empty_log() {
    let dir = TempDir::new().unwrap();
    let loaded = memory_store::load(&dir.path().join("absent.json")).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_blank_file_is_empty_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.json");
    fs::write(&path, "  \n").unwrap();
    assert!(memory_store::load(&path).unwrap().is_empty());
}

#[test]
fn test_save_then_load_preserves_interactions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.json");
    let interactions: Vec<Interaction> = (0..3).map(interaction).collect();

    memory_store::save(&path, &interactions).unwrap();
    let loaded = memory_store::load(&path).unwrap();

    assert_eq!(loaded, interactions);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("log.json");
    memory_store::save(&path, &[interaction(1)]).unwrap();
    assert_eq!(memory_store::load(&path).unwrap().len(), 1);
}

#[test]
fn test_saved_file_is_a_json_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.json");
    memory_store::save(&path, &[interaction(7)]).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_input"], "question 7");
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.json");
    fs::write(&path, "{not json").unwrap();
    let err = memory_store::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("not a valid interaction log"));
}

#[test]
fn test_agent_log_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.json");

    let mut first = Agent::offline(&AgentConfig::default()).unwrap();
    first.process("Quais são as 10 cidades com maior PIB?");
    assert_eq!(memory_store::save_from(&first, &path).unwrap(), 1);

    let mut second = Agent::offline(&AgentConfig::default()).unwrap();
    assert_eq!(memory_store::load_into(&mut second, &path).unwrap(), 1);
    assert_eq!(second.search_memory("maior pib").len(), 1);
}

#[test]
fn test_load_respects_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.json");
    let interactions: Vec<Interaction> = (0..5).map(interaction).collect();
    memory_store::save(&path, &interactions).unwrap();

    let mut config = AgentConfig::default();
    config.agent.max_memory_size = 2;
    let mut agent = Agent::offline(&config).unwrap();

    assert_eq!(memory_store::load_into(&mut agent, &path).unwrap(), 2);
    let kept: Vec<String> = agent
        .export_memory()
        .into_iter()
        .map(|i| i.user_input)
        .collect();
    assert_eq!(kept, vec!["question 3", "question 4"]);
}
