mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use examdesk::cache::{clear_cache, CachingProvider};
use examdesk::error::ExtractionError;
use examdesk::extract::{spawn_extraction, ExtractionProvider, SourceDocument};

use examdesk::session::{Phase, SessionController};

use common::{pdf, raw_question, temp_dir, three_question_quiz, FakeProvider};

const LIMIT: u64 = 1024 * 1024;

#[test]
fn test_document_from_path() {
    let dir = temp_dir("admission");
    let path = dir.join("paper.pdf");
    fs::write(&path, b"%PDF-1.5\nbody").unwrap();

    let doc = SourceDocument::from_path(&path, LIMIT).unwrap();
    assert_eq!(doc.file_name(), "paper.pdf");
    assert_eq!(doc.bytes(), b"%PDF-1.5\nbody");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_document_rejections_from_path() {
    let dir = temp_dir("rejections");

    let text = dir.join("notes.pdf");
    fs::write(&text, b"just some text").unwrap();
    assert!(matches!(
        SourceDocument::from_path(&text, LIMIT).unwrap_err(),
        ExtractionError::NotPdf
    ));

    let big = dir.join("big.pdf");
    fs::write(&big, vec![b'%'; 2048]).unwrap();
    assert!(matches!(
        SourceDocument::from_path(&big, 1024).unwrap_err(),
        ExtractionError::TooLarge { size: 2048, limit: 1024 }
    ));

    let missing = dir.join("missing.pdf");
    assert!(matches!(
        SourceDocument::from_path(&missing, LIMIT).unwrap_err(),
        ExtractionError::Io(_)
    ));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_pdf_header_must_be_near_the_start() {
    let mut near = vec![b' '; 100];
    near.extend_from_slice(b"%PDF-1.4");
    assert!(SourceDocument::from_bytes("near.pdf", near, LIMIT).is_ok());

    let mut far = vec![b' '; 2000];
    far.extend_from_slice(b"%PDF-1.4");
    assert!(matches!(
        SourceDocument::from_bytes("far.pdf", far, LIMIT).unwrap_err(),
        ExtractionError::NotPdf
    ));
}

#[test]
fn test_worker_delivers_tagged_result() {
    let provider: Arc<dyn ExtractionProvider> =
        Arc::new(FakeProvider::returning(three_question_quiz()));
    let rx = spawn_extraction(provider, pdf("w.pdf", "worker"), 7);

    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(event.epoch, 7);
    assert_eq!(event.result.unwrap().questions.len(), 3);
}

#[test]
fn test_cache_serves_repeat_documents() {
    let dir = temp_dir("cache_hit");
    let fake = Arc::new(FakeProvider::returning(three_question_quiz()));
    let provider = CachingProvider::new(Arc::clone(&fake), dir.join("extractions"));
    let doc = pdf("c.pdf", "cached");

    let first = provider.extract(&doc).unwrap();
    let second = provider.extract(&doc).unwrap();
    assert_eq!(fake.calls(), 1);
    assert_eq!(first.title, second.title);
    assert_eq!(second.questions.len(), 3);

    let entry = provider.dir().join(format!("{}.json", doc.sha256_hex()));
    assert!(entry.exists());

    // A different document misses.
    provider.extract(&pdf("d.pdf", "other")).unwrap();
    assert_eq!(fake.calls(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_cache_skips_failures() {
    let dir = temp_dir("cache_fail");
    let fake = Arc::new(FakeProvider::failing_once(ExtractionError::EmptyResponse));
    let provider = CachingProvider::new(Arc::clone(&fake), dir.join("extractions"));
    let doc = pdf("f.pdf", "fails");

    assert!(provider.extract(&doc).is_err());
    // The fake has nothing else to give, so the second call fails too, but
    // it must have reached the fake again.
    assert!(provider.extract(&doc).is_err());
    assert_eq!(fake.calls(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_cache_skips_quizzes_that_fail_validation() {
    let dir = temp_dir("cache_invalid");
    let mut bad = three_question_quiz();
    bad.questions[1] = raw_question("q2", 7);
    let fake = Arc::new(FakeProvider::returning(bad));
    let provider = CachingProvider::new(Arc::clone(&fake), dir.join("extractions"));
    let doc = pdf("bad.pdf", "out of bounds");

    let mut session = SessionController::new();
    session.load(&provider, &doc).unwrap();
    assert_eq!(session.phase(), Phase::Idle);
    session.load(&provider, &doc).unwrap();
    assert_eq!(session.phase(), Phase::Idle);

    assert_eq!(fake.calls(), 2);
    let entry = provider.dir().join(format!("{}.json", doc.sha256_hex()));
    assert!(!entry.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_cache_entry_is_a_miss() {
    let dir = temp_dir("cache_invalid_entry");
    let fake = Arc::new(FakeProvider::returning(three_question_quiz()));
    let provider = CachingProvider::new(Arc::clone(&fake), dir.join("extractions"));
    let doc = pdf("i.pdf", "stale entry");

    let mut bad = three_question_quiz();
    bad.questions.clear();
    fs::create_dir_all(provider.dir()).unwrap();
    let entry = provider.dir().join(format!("{}.json", doc.sha256_hex()));
    fs::write(&entry, serde_json::to_string(&bad).unwrap()).unwrap();

    let raw = provider.extract(&doc).unwrap();
    assert_eq!(raw.questions.len(), 3);
    assert_eq!(fake.calls(), 1);

    // Replaced by the valid result.
    provider.extract(&doc).unwrap();
    assert_eq!(fake.calls(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_cache_entry_is_a_miss() {
    let dir = temp_dir("cache_corrupt");
    let fake = Arc::new(FakeProvider::returning(three_question_quiz()));
    let provider = CachingProvider::new(Arc::clone(&fake), dir.join("extractions"));
    let doc = pdf("g.pdf", "corrupt");

    fs::create_dir_all(provider.dir()).unwrap();
    let entry = provider.dir().join(format!("{}.json", doc.sha256_hex()));
    fs::write(&entry, "{ not json").unwrap();

    let raw = provider.extract(&doc).unwrap();
    assert_eq!(raw.questions.len(), 3);
    assert_eq!(fake.calls(), 1);

    // The entry was rewritten with the fresh result.
    provider.extract(&doc).unwrap();
    assert_eq!(fake.calls(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_clear_cache() {
    let dir = temp_dir("cache_clear");
    let cache_dir = dir.join("extractions");
    let fake = Arc::new(FakeProvider::returning(three_question_quiz()));
    let provider = CachingProvider::new(Arc::clone(&fake), cache_dir.clone());
    provider.extract(&pdf("h.pdf", "clear")).unwrap();
    assert!(cache_dir.exists());

    clear_cache(&cache_dir).unwrap();
    assert!(!cache_dir.exists());
    // Clearing twice is fine.
    clear_cache(&cache_dir).unwrap();

    let _ = fs::remove_dir_all(&dir);
}
