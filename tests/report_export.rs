mod common;

use std::fs;

use examdesk::report::{export, format_summary};
use examdesk::scoring::Report;
use examdesk::session::SessionController;

use common::{pdf, temp_dir, three_question_quiz, FakeProvider};

fn finished_report() -> Report {
    let provider = FakeProvider::returning(three_question_quiz());
    let mut session = SessionController::new();
    session.load(&provider, &pdf("r.pdf", "report")).unwrap();
    let epoch = session.start().unwrap();
    session.tick(epoch).unwrap();
    session.select(0).unwrap();
    session.save_and_next().unwrap();
    session.select(3).unwrap();
    session.save_and_next().unwrap();
    session.submit().unwrap().clone()
}

#[test]
fn test_export_yaml() {
    let dir = temp_dir("export_yaml");
    let path = dir.join("out").join("report.yaml");
    export(&finished_report(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
    assert_eq!(doc["title"].as_str(), Some("Practice Set"));
    assert_eq!(doc["score"].as_u64(), Some(1));
    assert_eq!(doc["forced"].as_bool(), Some(false));
    assert_eq!(doc["questions"][1]["status"].as_str(), Some("answered"));
    assert_eq!(doc["questions"][1]["selected_option"].as_u64(), Some(3));
    assert_eq!(doc["questions"][2]["status"].as_str(), Some("not-answered"));
    assert!(!path.with_extension("tmp").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_export_json() {
    let dir = temp_dir("export_json");
    let path = dir.join("report.json");
    export(&finished_report(), &path).unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["question_count"], 3);
    assert_eq!(doc["accuracy_percent"], 33);
    assert_eq!(doc["total_time_seconds"], 1);
    assert_eq!(doc["status_counts"]["answered"], 2);
    assert!(doc["questions"][0]["is_correct"].as_bool().unwrap());
    assert!(doc["source_sha256"].is_string());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_export_unknown_extension() {
    let dir = temp_dir("export_bad");
    let path = dir.join("report.txt");
    assert!(export(&finished_report(), &path).is_err());
    assert!(!path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_summary_text() {
    let summary = format_summary(&finished_report());
    assert!(summary.contains("Score: 1 / 3 Marks (33%)"));
    assert!(summary.contains("Answered: 2, Not answered: 1, Marked: 0, Not visited: 0"));
    assert!(!summary.contains("automatically"));
}
