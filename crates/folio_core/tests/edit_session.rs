use folio_core::db::open_db_in_memory;
use folio_core::editor::draft_store::{begin_edit_copies, discard_to};
use folio_core::editor::section_editor::{self, apply_ops};
use folio_core::{
    AssetRef, AssetTarget, AssetUploader, BlockType, ContentBlock, DetailService, DraftStore,
    EditSession, PersistFailure, Record, RecordId, RecordRepository, RepoError, RepoResult,
    SectionError, SectionOp, SessionError, SessionState, SqliteRecordRepository, StaticAuth,
    UploadError,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

fn scenario_record() -> Record {
    let mut record = Record::new(1).unwrap();
    record.sections = vec![ContentBlock::new(BlockType::Text, "a")];
    record
}

fn rich_record(id: RecordId) -> Record {
    let mut record = Record::new(id).unwrap();
    record.title = format!("Piece {id}");
    record.description = "Glazed **stoneware**.".to_string();
    record.category = vec!["Ceramics".to_string()];
    record.tags = vec!["clay".to_string(), "kiln".to_string()];
    record.date = "Spring 2021".to_string();
    record.image = Some("/uploads/cover.png".to_string());
    record.group = Some("process".to_string());
    record.sections = vec![
        ContentBlock::new(BlockType::Text, "intro"),
        ContentBlock::new(BlockType::Image, "/uploads/a.png"),
        ContentBlock::new(BlockType::Code, "fn main() {}"),
    ];
    record
}

fn sample_records() -> Vec<Record> {
    vec![Record::new(7).unwrap(), scenario_record(), rich_record(3)]
}

/// Repository answering saves from a script and recording what it received.
#[derive(Default)]
struct ScriptedRepo {
    outcomes: RefCell<VecDeque<RepoResult<()>>>,
    persisted: RefCell<Vec<Record>>,
}

impl ScriptedRepo {
    fn with_outcomes(outcomes: Vec<RepoResult<()>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            persisted: RefCell::new(Vec::new()),
        }
    }
}

impl RecordRepository for ScriptedRepo {
    fn fetch_record(&self, _id: RecordId) -> RepoResult<Option<Record>> {
        Ok(None)
    }

    fn persist_record(&self, _id: RecordId, record: &Record) -> RepoResult<()> {
        let outcome = self.outcomes.borrow_mut().pop_front().unwrap_or(Ok(()));
        if outcome.is_ok() {
            self.persisted.borrow_mut().push(record.clone());
        }
        outcome
    }

    fn create_record(&self, record: &Record) -> RepoResult<RecordId> {
        Ok(record.id())
    }

    fn list_records(&self) -> RepoResult<Vec<Record>> {
        Ok(self.persisted.borrow().clone())
    }
}

struct FailingUploader {
    calls: Cell<usize>,
    error: UploadError,
}

impl AssetUploader for FailingUploader {
    fn upload_asset(&self, _file_name: &str, _bytes: &[u8]) -> Result<AssetRef, UploadError> {
        self.calls.set(self.calls.get() + 1);
        Err(self.error.clone())
    }
}

struct FixedUploader(&'static str);

impl AssetUploader for FixedUploader {
    fn upload_asset(&self, _file_name: &str, _bytes: &[u8]) -> Result<AssetRef, UploadError> {
        Ok(AssetRef::new(self.0))
    }
}

#[test]
fn begin_edit_then_discard_returns_original_record() {
    for record in sample_records() {
        let (mut draft, snapshot) = begin_edit_copies(Some(&record)).unwrap();
        draft.title = "changed".to_string();
        draft.sections = section_editor::append(&draft.sections, BlockType::Code);
        assert_eq!(discard_to(snapshot), record);
    }
}

#[test]
fn draft_store_discard_restores_committed_record() {
    for record in sample_records() {
        let mut store = DraftStore::new(Some(record.clone()));
        store.begin_edit().unwrap();
        store
            .update_draft(|draft| -> Result<Record, SectionError> {
                let mut next = draft.clone();
                next.tags.clear();
                next.sections = section_editor::append(&draft.sections, BlockType::Text);
                Ok(next)
            })
            .unwrap()
            .unwrap();

        assert_eq!(store.discard().unwrap(), &record);
        assert!(!store.is_editing());
        assert!(store.draft().is_none());
        assert!(store.snapshot().is_none());
    }
}

#[test]
fn committed_sections_match_operations_applied_in_order() {
    let original = rich_record(3);
    let ops = vec![
        SectionOp::Append(BlockType::Image),
        SectionOp::SetContent {
            index: 3,
            content: "/uploads/b.png".to_string(),
        },
        SectionOp::Remove(0),
        SectionOp::Append(BlockType::Text),
        SectionOp::SetContent {
            index: 3,
            content: "outro".to_string(),
        },
        SectionOp::Remove(1),
    ];
    let expected = apply_ops(&original.sections, &ops).unwrap();

    let mut session = EditSession::new(Some(original.clone()), StaticAuth::operator());
    session.start_edit().unwrap();
    for op in &ops {
        match op {
            SectionOp::Append(kind) => session.append_section(*kind).unwrap(),
            SectionOp::Remove(index) => session.remove_section(*index).unwrap(),
            SectionOp::SetContent { index, content } => session
                .set_section_content(*index, content.as_str())
                .unwrap(),
        };
    }
    let repo = ScriptedRepo::default();
    let committed = session.save(&repo).unwrap();

    assert_eq!(committed.sections, expected);
    assert_eq!(
        committed
            .sections
            .iter()
            .map(ContentBlock::kind)
            .collect::<Vec<_>>(),
        vec![BlockType::Image, BlockType::Image, BlockType::Text]
    );
    assert_eq!(repo.persisted.borrow()[0].sections, expected);
}

#[test]
fn append_text_adds_one_empty_text_block() {
    let original = rich_record(3).sections;
    let next = section_editor::append_named(&original, "text").unwrap();

    assert_eq!(next.len(), original.len() + 1);
    assert_eq!(next.last(), Some(&ContentBlock::new(BlockType::Text, "")));
    assert_eq!(&next[..original.len()], &original[..]);
}

#[test]
fn append_with_unknown_type_is_invalid_input() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();

    let err = session.append_section_named("video").unwrap_err();
    assert_eq!(
        err,
        SessionError::InvalidInput(SectionError::InvalidBlockType("video".to_string()))
    );
    assert_eq!(session.draft().unwrap().sections, scenario_record().sections);
}

#[test]
fn remove_in_range_preserves_relative_order() {
    let original = rich_record(3).sections;
    for index in 0..original.len() {
        let next = section_editor::remove(&original, index).unwrap();
        let mut expected = original.clone();
        expected.remove(index);
        assert_eq!(next.len(), original.len() - 1);
        assert_eq!(next, expected);
    }
}

#[test]
fn remove_out_of_range_is_rejected_and_leaves_draft_unchanged() {
    let mut session = EditSession::new(Some(rich_record(3)), StaticAuth::operator());
    session.start_edit().unwrap();
    let before = session.draft().unwrap().clone();

    let err = session.remove_section(3).unwrap_err();
    assert_eq!(
        err,
        SessionError::InvalidInput(SectionError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert_eq!(session.draft().unwrap(), &before);
    assert_eq!(session.state(), SessionState::Editing);
}

#[test]
fn draft_content_edits_never_reach_snapshot() {
    let mut session = EditSession::new(Some(rich_record(3)), StaticAuth::operator());
    session.start_edit().unwrap();

    for index in 0..3 {
        session
            .set_section_content(index, format!("edited {index}"))
            .unwrap();
        assert_eq!(
            session.draft().unwrap().sections[index].content,
            format!("edited {index}")
        );
        assert_eq!(
            session.snapshot().unwrap().sections[index],
            rich_record(3).sections[index]
        );
    }
    assert_eq!(session.committed().unwrap(), &rich_record(3));
}

#[test]
fn cancel_after_append_and_set_content_keeps_committed_sections() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    session.append_section_named("image").unwrap();
    session
        .set_section_content(1, "http://x/y.png")
        .unwrap();

    let restored = session.cancel().unwrap();
    assert_eq!(
        restored.sections,
        vec![ContentBlock::new(BlockType::Text, "a")]
    );
    assert_eq!(session.state(), SessionState::Viewing);
    assert_eq!(
        session.committed().unwrap().sections,
        vec![ContentBlock::new(BlockType::Text, "a")]
    );
}

#[test]
fn remove_then_save_commits_empty_sections() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    repo.create_record(&scenario_record()).unwrap();
    let service = DetailService::new(&repo);

    let mut session = service.open_session(1, StaticAuth::operator()).unwrap();
    session.start_edit().unwrap();
    session.remove_section(0).unwrap();
    let committed = service.save(&mut session).unwrap();

    assert!(committed.sections.is_empty());
    assert_eq!(session.state(), SessionState::Viewing);
    assert!(repo.fetch_record(1).unwrap().unwrap().sections.is_empty());
}

#[test]
fn failed_upload_keeps_image_and_editing_state() {
    let mut record = scenario_record();
    record.image = Some("/uploads/old.png".to_string());
    let mut session = EditSession::new(Some(record), StaticAuth::operator());
    session.start_edit().unwrap();

    let uploader = FailingUploader {
        calls: Cell::new(0),
        error: UploadError::Transport("connection reset".to_string()),
    };
    let err = session
        .attach_asset(&uploader, AssetTarget::Image, "new.png", b"png")
        .unwrap_err();

    assert_eq!(uploader.calls.get(), 1);
    assert_eq!(err.user_message(), "Upload error");
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(
        session.draft().unwrap().image.as_deref(),
        Some("/uploads/old.png")
    );
}

#[test]
fn rejected_upload_surfaces_reason() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    let uploader = FailingUploader {
        calls: Cell::new(0),
        error: UploadError::Rejected("File too large".to_string()),
    };

    let err = session
        .attach_asset(&uploader, AssetTarget::Files, "big.zip", b"zip")
        .unwrap_err();
    assert_eq!(err.user_message(), "File too large");
    assert_eq!(session.draft().unwrap().files, None);
}

#[test]
fn uploads_land_in_draft_only() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    session.append_section(BlockType::Image).unwrap();

    let uploader = FixedUploader("/uploads/fresh.png");
    session
        .attach_asset(&uploader, AssetTarget::Image, "fresh.png", b"png")
        .unwrap();
    session
        .attach_asset(&uploader, AssetTarget::SectionImage(1), "fresh.png", b"png")
        .unwrap();

    let draft = session.draft().unwrap();
    assert_eq!(draft.image.as_deref(), Some("/uploads/fresh.png"));
    assert_eq!(draft.sections[1].content, "/uploads/fresh.png");
    assert_eq!(session.snapshot().unwrap().image, None);
    assert_eq!(session.committed().unwrap().image, None);
}

#[test]
fn section_upload_to_text_block_is_rejected_before_uploading() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    let uploader = FailingUploader {
        calls: Cell::new(0),
        error: UploadError::Rejected("unused".to_string()),
    };

    let err = session
        .attach_asset(&uploader, AssetTarget::SectionImage(0), "a.png", b"png")
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidInput(SectionError::UnexpectedBlockType { index: 0, .. })
    ));
    assert_eq!(uploader.calls.get(), 0);
}

#[test]
fn persist_failure_keeps_draft_and_allows_retry() {
    let repo = ScriptedRepo::with_outcomes(vec![Err(RepoError::NotFound(1)), Ok(())]);
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    session.set_title("Retitled").unwrap();

    let err = session.save(&repo).unwrap_err();
    assert!(matches!(
        err,
        SessionError::PersistFailure(PersistFailure::Rejected(_))
    ));
    assert_eq!(err.user_message(), "Failed to update");
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.draft().unwrap().title, "Retitled");
    assert_eq!(session.committed().unwrap().title, "");

    let committed = session.save(&repo).unwrap();
    assert_eq!(committed.title, "Retitled");
    assert_eq!(repo.persisted.borrow().len(), 1);
}

#[test]
fn persist_failure_then_cancel_restores_snapshot() {
    let repo = ScriptedRepo::with_outcomes(vec![Err(RepoError::InvalidData(
        "store offline".to_string(),
    ))]);
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    session.remove_section(0).unwrap();

    session.save(&repo).unwrap_err();
    let restored = session.cancel().unwrap();
    assert_eq!(restored, &scenario_record());
}

#[test]
fn asynchronous_save_is_single_flight() {
    let mut session = EditSession::new(Some(scenario_record()), StaticAuth::operator());
    session.start_edit().unwrap();
    session.set_date("2024").unwrap();

    let pending = session.begin_save().unwrap();
    assert_eq!(pending.value.date, "2024");
    assert!(session.is_save_pending());
    assert_eq!(session.begin_save().unwrap_err(), SessionError::SavePending);
    assert_eq!(session.cancel().unwrap_err(), SessionError::SavePending);
    assert_eq!(
        session.remove_section(0).unwrap_err(),
        SessionError::SavePending
    );

    let committed = session.finish_save(Ok(())).unwrap();
    assert_eq!(committed.date, "2024");
    assert!(!session.is_save_pending());
    assert_eq!(session.state(), SessionState::Viewing);
}

#[test]
fn auth_capability_is_read_at_start_edit() {
    let signed_in = Cell::new(false);
    let auth = || signed_in.get();
    let mut session = EditSession::new(Some(scenario_record()), auth);

    assert_eq!(
        session.start_edit().unwrap_err(),
        SessionError::NotAuthenticated
    );
    signed_in.set(true);
    assert!(session.can_edit());
    session.start_edit().unwrap();
    assert_eq!(
        session.start_edit().unwrap_err(),
        SessionError::AlreadyEditing
    );
}
