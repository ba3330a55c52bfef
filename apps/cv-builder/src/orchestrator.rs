//! Orchestrator: wires user intents to the document, the drafting client and the exporter.
//!
//! Session state sits behind one mutex that is never held across an `.await`. AI calls and
//! exports run without it, so edits to other fields stay responsive while they are in flight.
//! Busy flags are cleared by guard objects, on success, error, panic or drop alike. The export
//! guard lives inside the blocking task, so the flag stays set until the file work itself ends,
//! even if the request that started it goes away.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::credential::{CredentialError, CredentialStore};
use crate::export::{export_filename, export_to_file, ExportError, PageFormat, SurfaceCapture};
use crate::generation::drafting::{DraftError, DraftingClient};
use crate::generation::prompts::{experience_prompt, summary_prompt};
use crate::generation::tracker::{GenerationKey, GenerationTarget, GenerationTracker};
use crate::models::fields::ExperienceField;
use crate::models::{Document, EntryField, EntryId, ListKind, PersonalField};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("No experience entry at position {0}")]
    NoSuchEntry(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("No {list} entry at position {index}")]
    NoSuchEntry { list: ListKind, index: usize },
}

/// What happened to a generate intent.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The drafted text was merged into the document.
    Applied { key: GenerationKey, text: String },
    /// A request for this key was already in flight; nothing was dispatched.
    Busy,
    /// The target entry was removed while the request was in flight; the text was dropped.
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub filename: String,
    pub path: PathBuf,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub format: PageFormat,
}

/// Everything the UI needs to redraw.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub document: Document,
    pub generating: Vec<GenerationKey>,
    pub exporting: bool,
    pub has_credential: bool,
}

struct SessionState {
    document: Arc<Document>,
    tracker: GenerationTracker,
    exporting: bool,
}

pub struct Orchestrator {
    state: Arc<Mutex<SessionState>>,
    credential: RwLock<String>,
    credential_store: Arc<dyn CredentialStore>,
    drafting: DraftingClient,
    capturer: Arc<dyn SurfaceCapture>,
    export: ExportSettings,
}

// ────────────────────────────────────────────────────────────────────────────
// Guards
// ────────────────────────────────────────────────────────────────────────────

struct GenerationGuard<'a> {
    orchestrator: &'a Orchestrator,
    key: GenerationKey,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.state.lock().tracker.end(self.key);
    }
}

/// Owns its handle on the session so it can move into `spawn_blocking`.
struct ExportGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.state.lock().exporting = false;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

impl Orchestrator {
    /// Builds the session and loads the stored credential.
    pub fn new(
        document: Document,
        drafting: DraftingClient,
        credential_store: Arc<dyn CredentialStore>,
        capturer: Arc<dyn SurfaceCapture>,
        export: ExportSettings,
    ) -> Result<Self, CredentialError> {
        let credential = credential_store.load()?.unwrap_or_default();
        if credential.is_empty() {
            info!("No Gemini API key stored; AI drafting disabled until one is saved");
        }

        Ok(Self {
            state: Arc::new(Mutex::new(SessionState {
                document: Arc::new(document),
                tracker: GenerationTracker::new(),
                exporting: false,
            })),
            credential: RwLock::new(credential),
            credential_store,
            drafting,
            capturer,
            export,
        })
    }

    pub fn document(&self) -> Arc<Document> {
        self.state.lock().document.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            document: (*state.document).clone(),
            generating: state.tracker.busy_keys(),
            exporting: state.exporting,
            has_credential: self.has_credential(),
        }
    }

    pub fn is_generating(&self, target: GenerationTarget) -> bool {
        self.state.lock().tracker.is_busy(target.key())
    }

    pub fn is_exporting(&self) -> bool {
        self.state.lock().exporting
    }

    // ── Document edits ──────────────────────────────────────────────────────

    pub fn set_personal_field(&self, field: PersonalField, value: &str) -> Arc<Document> {
        self.swap(|doc| doc.set_personal_field(field, value))
    }

    pub fn set_summary(&self, value: &str) -> Arc<Document> {
        self.swap(|doc| doc.set_summary(value))
    }

    pub fn set_entry_field(
        &self,
        index: usize,
        field: EntryField,
        value: &str,
    ) -> Result<Arc<Document>, EditError> {
        let list = field.list();
        self.try_swap(|doc| {
            check_index(doc, list, index)?;
            Ok(doc.set_entry_field(list, index, field, value))
        })
    }

    pub fn add_entry(&self, list: ListKind) -> Arc<Document> {
        self.swap(|doc| doc.add_entry(list))
    }

    pub fn remove_entry(&self, list: ListKind, index: usize) -> Result<Arc<Document>, EditError> {
        self.try_swap(|doc| {
            check_index(doc, list, index)?;
            Ok(doc.remove_entry(list, index))
        })
    }

    fn swap<F>(&self, edit: F) -> Arc<Document>
    where
        F: FnOnce(&Document) -> Document,
    {
        let mut state = self.state.lock();
        let next = Arc::new(edit(&state.document));
        state.document = next.clone();
        next
    }

    /// Like `swap`, for edits that validate first. Bounds are checked under the same lock as
    /// the swap, so a concurrent removal cannot slip in between.
    fn try_swap<F>(&self, edit: F) -> Result<Arc<Document>, EditError>
    where
        F: FnOnce(&Document) -> Result<Document, EditError>,
    {
        let mut state = self.state.lock();
        let next = Arc::new(edit(&state.document)?);
        state.document = next.clone();
        Ok(next)
    }

    // ── Credential ──────────────────────────────────────────────────────────

    pub fn has_credential(&self) -> bool {
        !self.credential.read().trim().is_empty()
    }

    /// Persists the key, then makes it the process-wide value.
    pub fn save_credential(&self, credential: &str) -> Result<(), CredentialError> {
        let credential = credential.trim();
        self.credential_store.store(credential)?;
        *self.credential.write() = credential.to_string();
        Ok(())
    }

    // ── AI drafting ─────────────────────────────────────────────────────────

    /// Drafts text for `target` and merges it into the document.
    ///
    /// `Idle -> Requesting` happens only when the key is idle; a busy key returns
    /// `GenerateOutcome::Busy` without dispatching. `Requesting -> Idle` always happens when
    /// the call settles.
    pub async fn generate(&self, target: GenerationTarget) -> Result<GenerateOutcome, GenerateError> {
        let credential = self.credential.read().clone();
        if credential.trim().is_empty() {
            return Err(DraftError::MissingCredential.into());
        }

        let key = target.key();
        let (prompt, anchor) = {
            let mut state = self.state.lock();
            let (prompt, anchor) = match target {
                GenerationTarget::Summary => (summary_prompt(&state.document), None),
                GenerationTarget::ExperienceDescription(index) => {
                    let entry = state
                        .document
                        .experience
                        .get(index)
                        .ok_or(GenerateError::NoSuchEntry(index))?;
                    (
                        experience_prompt(&entry.role, &entry.company),
                        Some(entry.id.clone()),
                    )
                }
            };
            if !state.tracker.try_begin(key) {
                return Ok(GenerateOutcome::Busy);
            }
            (prompt, anchor)
        };
        let _guard = GenerationGuard {
            orchestrator: self,
            key,
        };

        info!("Generating content for {key}");
        let text = self.drafting.generate(&prompt, &credential).await.map_err(|e| {
            warn!("Generation for {key} failed: {e}");
            e
        })?;

        let mut state = self.state.lock();
        match anchor {
            None => {
                state.document = Arc::new(state.document.set_summary(&text));
            }
            Some(id) => match merge_description(&state.document, &id, &text) {
                Some(next) => state.document = Arc::new(next),
                None => {
                    warn!("Experience entry {id} was removed during generation; discarding result");
                    return Ok(GenerateOutcome::Discarded);
                }
            },
        }

        Ok(GenerateOutcome::Applied { key, text })
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// Captures `surface`, paginates it and writes the PDF into the export directory.
    /// Only one export runs at a time; a second request gets `ExportError::InProgress`.
    /// Dropping the returned future does not end the export early: the flag is held by the
    /// blocking task until the file work finishes.
    pub async fn export(&self, surface: PathBuf) -> Result<ExportReceipt, ExportError> {
        let name = {
            let mut state = self.state.lock();
            if state.exporting {
                return Err(ExportError::InProgress);
            }
            state.exporting = true;
            state.document.personal.name.clone()
        };
        let guard = ExportGuard {
            state: self.state.clone(),
        };

        let filename = export_filename(&name);
        let path = self.export.dir.join(&filename);
        if path.parent() != Some(self.export.dir.as_path()) {
            return Err(ExportError::ExportFailed(format!(
                "refusing to write {} outside {}",
                path.display(),
                self.export.dir.display()
            )));
        }
        let capturer = self.capturer.clone();
        let format = self.export.format;
        let dir = self.export.dir.clone();
        let output = path.clone();

        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            std::fs::create_dir_all(&dir).map_err(|e| {
                ExportError::ExportFailed(format!("creating {}: {e}", dir.display()))
            })?;
            export_to_file(capturer.as_ref(), &surface, format, &output)
        })
        .await
        .map_err(|e| ExportError::ExportFailed(format!("export task failed: {e}")))
        .and_then(|inner| inner);

        match result {
            Ok(pages) => {
                info!("Exported {pages} page(s) to {}", path.display());
                Ok(ExportReceipt {
                    filename,
                    path,
                    pages,
                })
            }
            Err(e) => {
                error!("Export failed: {e}");
                Err(e)
            }
        }
    }
}

fn check_index(doc: &Document, list: ListKind, index: usize) -> Result<(), EditError> {
    if index < doc.entries_len(list) {
        Ok(())
    } else {
        Err(EditError::NoSuchEntry { list, index })
    }
}

/// Writes `text` into the description of the experience entry with `id`, wherever it now is.
fn merge_description(doc: &Document, id: &EntryId, text: &str) -> Option<Document> {
    let position = doc.position_of(ListKind::Experience, id)?;
    Some(doc.set_entry_field(
        ListKind::Experience,
        position,
        EntryField::Experience(ExperienceField::Description),
        text,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use tokio::sync::Notify;

    use super::*;
    use crate::credential::MemoryCredentialStore;
    use crate::export::RasterCapture;
    use crate::generation::drafting::tests::ScriptedGenerator;
    use crate::llm_client::{ContentGenerator, ContentRequest, LlmError};
    use crate::models::fields::SkillField;

    /// Holds every call until `release` is notified.
    struct GatedGenerator {
        gate: Notify,
        reply: String,
    }

    #[async_trait]
    impl ContentGenerator for GatedGenerator {
        async fn generate_content(&self, _request: ContentRequest<'_>) -> Result<String, LlmError> {
            self.gate.notified().await;
            Ok(self.reply.clone())
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl ContentGenerator for PanickingGenerator {
        async fn generate_content(&self, _request: ContentRequest<'_>) -> Result<String, LlmError> {
            panic!("provider blew up");
        }
    }

    struct FixedCapture(u32, u32);

    impl SurfaceCapture for FixedCapture {
        fn capture(&self, _surface: &Path) -> Result<RasterCapture, ExportError> {
            Ok(RasterCapture::new(RgbImage::from_pixel(
                self.0,
                self.1,
                Rgb([255, 255, 255]),
            )))
        }
    }

    /// Sleeps inside `capture` and records how many captures overlap.
    #[derive(Default)]
    struct SlowCapture {
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl SurfaceCapture for SlowCapture {
        fn capture(&self, _surface: &Path) -> Result<RasterCapture, ExportError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(RasterCapture::new(RgbImage::from_pixel(
                10,
                10,
                Rgb([255, 255, 255]),
            )))
        }
    }

    struct FailingCapture;

    impl SurfaceCapture for FailingCapture {
        fn capture(&self, _surface: &Path) -> Result<RasterCapture, ExportError> {
            Err(ExportError::ExportFailed("renderer crashed".to_string()))
        }
    }

    fn orchestrator_with(
        generator: Arc<dyn ContentGenerator>,
        credential: Option<&str>,
        capturer: Arc<dyn SurfaceCapture>,
        export_dir: &Path,
    ) -> Orchestrator {
        let store = match credential {
            Some(c) => MemoryCredentialStore::with_value(c),
            None => MemoryCredentialStore::default(),
        };
        Orchestrator::new(
            Document::sample(),
            DraftingClient::new(generator),
            Arc::new(store),
            capturer,
            ExportSettings {
                dir: export_dir.to_path_buf(),
                format: PageFormat::A4,
            },
        )
        .unwrap()
    }

    fn simple(generator: Arc<dyn ContentGenerator>, credential: Option<&str>) -> Orchestrator {
        orchestrator_with(
            generator,
            credential,
            Arc::new(FixedCapture(10, 10)),
            Path::new("unused"),
        )
    }

    async fn wait_until_busy(orchestrator: &Orchestrator, target: GenerationTarget) {
        for _ in 0..1000 {
            if orchestrator.is_generating(target) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("{target:?} never became busy");
    }

    // ── generation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_summary_generation_merges_result() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("Drafted summary.")), Some("key"));
        let outcome = orchestrator.generate(GenerationTarget::Summary).await.unwrap();

        assert!(matches!(outcome, GenerateOutcome::Applied { .. }));
        assert_eq!(orchestrator.document().summary, "Drafted summary.");
        assert!(!orchestrator.is_generating(GenerationTarget::Summary));
    }

    #[tokio::test]
    async fn test_experience_generation_writes_description() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("- Shipped things")), Some("key"));
        let before = orchestrator.document();
        orchestrator
            .generate(GenerationTarget::ExperienceDescription(1))
            .await
            .unwrap();

        let after = orchestrator.document();
        assert_eq!(after.experience[1].description, "- Shipped things");
        assert_eq!(after.experience[0], before.experience[0]);
        assert_eq!(after.summary, before.summary);
    }

    #[tokio::test]
    async fn test_missing_credential_touches_nothing() {
        let generator = Arc::new(ScriptedGenerator::ok("x"));
        let orchestrator = simple(generator.clone(), None);

        let err = orchestrator.generate(GenerationTarget::Summary).await.unwrap_err();
        assert!(matches!(err, GenerateError::Draft(DraftError::MissingCredential)));
        assert_eq!(generator.call_count(), 0);
        assert!(orchestrator.snapshot().generating.is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_clears_busy_flag() {
        let generator = Arc::new(ScriptedGenerator::failing(500, "internal"));
        let orchestrator = simple(generator, Some("key"));
        let target = GenerationTarget::ExperienceDescription(0);
        let before = orchestrator.document();

        let err = orchestrator.generate(target).await.unwrap_err();
        assert!(matches!(err, GenerateError::Draft(DraftError::TransientFailure(_))));
        assert!(!orchestrator.is_generating(target));
        assert_eq!(*orchestrator.document(), *before, "failed draft leaves the document alone");
    }

    #[tokio::test]
    async fn test_invalid_credential_clears_busy_flag() {
        let generator = Arc::new(ScriptedGenerator::failing(
            400,
            "API key not valid. Please pass a valid API key.",
        ));
        let orchestrator = simple(generator, Some("bad"));
        let err = orchestrator.generate(GenerationTarget::Summary).await.unwrap_err();
        assert!(matches!(err, GenerateError::Draft(DraftError::InvalidCredential)));
        assert!(!orchestrator.is_generating(GenerationTarget::Summary));
    }

    #[tokio::test]
    async fn test_panicking_provider_clears_busy_flag() {
        let orchestrator = Arc::new(simple(Arc::new(PanickingGenerator), Some("key")));
        let task = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.generate(GenerationTarget::Summary).await })
        };
        assert!(task.await.is_err(), "task should have panicked");
        assert!(!orchestrator.is_generating(GenerationTarget::Summary));
    }

    #[tokio::test]
    async fn test_second_request_for_busy_key_is_rejected() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            reply: "Gated text".to_string(),
        });
        let orchestrator = Arc::new(simple(generator.clone(), Some("key")));
        let target = GenerationTarget::Summary;

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.generate(target).await })
        };
        wait_until_busy(&orchestrator, target).await;

        let second = orchestrator.generate(target).await.unwrap();
        assert_eq!(second, GenerateOutcome::Busy);

        // Other edits stay responsive while the request is in flight.
        orchestrator.set_personal_field(PersonalField::Phone, "555-0100");
        assert_eq!(orchestrator.document().personal.phone, "555-0100");

        generator.gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, GenerateOutcome::Applied { .. }));
        assert!(!orchestrator.is_generating(target));
        let doc = orchestrator.document();
        assert_eq!(doc.summary, "Gated text");
        assert_eq!(doc.personal.phone, "555-0100", "concurrent edit kept");
    }

    #[tokio::test]
    async fn test_different_keys_run_concurrently() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            reply: "text".to_string(),
        });
        let orchestrator = Arc::new(simple(generator.clone(), Some("key")));
        let a = GenerationTarget::ExperienceDescription(0);
        let b = GenerationTarget::ExperienceDescription(1);

        let tasks: Vec<_> = [a, b]
            .into_iter()
            .map(|t| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.generate(t).await })
            })
            .collect();
        wait_until_busy(&orchestrator, a).await;
        wait_until_busy(&orchestrator, b).await;
        assert_eq!(orchestrator.snapshot().generating.len(), 2);

        generator.gate.notify_waiters();
        for task in tasks {
            assert!(matches!(
                task.await.unwrap().unwrap(),
                GenerateOutcome::Applied { .. }
            ));
        }
        assert!(orchestrator.snapshot().generating.is_empty());
    }

    #[tokio::test]
    async fn test_result_follows_entry_that_shifted() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            reply: "Follows the entry".to_string(),
        });
        let orchestrator = Arc::new(simple(generator.clone(), Some("key")));
        let target = GenerationTarget::ExperienceDescription(1);
        let moved_id = orchestrator.document().experience[1].id.clone();

        let task = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.generate(target).await })
        };
        wait_until_busy(&orchestrator, target).await;
        orchestrator.remove_entry(ListKind::Experience, 0).unwrap();

        generator.gate.notify_one();
        task.await.unwrap().unwrap();
        let doc = orchestrator.document();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.experience[0].id, moved_id);
        assert_eq!(doc.experience[0].description, "Follows the entry");
    }

    #[tokio::test]
    async fn test_result_discarded_when_entry_removed() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            reply: "Orphan".to_string(),
        });
        let orchestrator = Arc::new(simple(generator.clone(), Some("key")));
        let target = GenerationTarget::ExperienceDescription(0);

        let task = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.generate(target).await })
        };
        wait_until_busy(&orchestrator, target).await;
        orchestrator.remove_entry(ListKind::Experience, 0).unwrap();

        generator.gate.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), GenerateOutcome::Discarded);
        assert!(!orchestrator.is_generating(target));
        assert!(orchestrator
            .document()
            .experience
            .iter()
            .all(|e| e.description != "Orphan"));
    }

    #[tokio::test]
    async fn test_generate_for_missing_entry() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("x")), Some("key"));
        let err = orchestrator
            .generate(GenerationTarget::ExperienceDescription(9))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::NoSuchEntry(9)));
    }

    #[tokio::test]
    async fn test_saved_credential_enables_generation() {
        let generator = Arc::new(ScriptedGenerator::ok("ok"));
        let orchestrator = simple(generator.clone(), None);
        assert!(!orchestrator.has_credential());

        orchestrator.save_credential("  new-key ").unwrap();
        assert!(orchestrator.has_credential());
        orchestrator.generate(GenerationTarget::Summary).await.unwrap();
        assert_eq!(generator.call_count(), 1);
    }

    // ── edits ───────────────────────────────────────────────────────────────

    #[test]
    fn test_edits_reject_out_of_range_index() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("x")), None);
        let err = orchestrator
            .set_entry_field(4, EntryField::Skill(SkillField::Name), "Go")
            .unwrap_err();
        assert_eq!(
            err,
            EditError::NoSuchEntry {
                list: ListKind::Skills,
                index: 4
            }
        );
        assert!(orchestrator.remove_entry(ListKind::Education, 1).is_err());
    }

    #[test]
    fn test_edits_swap_document() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("x")), None);
        let before = orchestrator.document();
        let after = orchestrator
            .set_entry_field(0, EntryField::Experience(ExperienceField::Role), "Lead")
            .unwrap();
        assert_eq!(after.experience[0].role, "Lead");
        assert_eq!(before.experience[0].role, "Senior Frontend Engineer");
        assert_eq!(orchestrator.add_entry(ListKind::Skills).skills.len(), 7);
    }

    // ── export ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_export_writes_named_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(
            Arc::new(ScriptedGenerator::ok("x")),
            None,
            Arc::new(FixedCapture(100, 400)),
            &dir.path().join("exports"),
        );

        let receipt = orchestrator.export(PathBuf::from("preview.png")).await.unwrap();
        assert_eq!(receipt.filename, "Jane_Doe.pdf");
        assert_eq!(receipt.pages, 3);
        assert!(receipt.path.is_file());
        assert!(!orchestrator.is_exporting());
    }

    #[tokio::test]
    async fn test_export_with_empty_name_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(
            Arc::new(ScriptedGenerator::ok("x")),
            None,
            Arc::new(FixedCapture(100, 100)),
            dir.path(),
        );
        orchestrator.set_personal_field(PersonalField::Name, "");
        let receipt = orchestrator.export(PathBuf::from("preview.png")).await.unwrap();
        assert_eq!(receipt.filename, "CV.pdf");
        assert_eq!(receipt.pages, 1);
    }

    #[tokio::test]
    async fn test_export_name_cannot_escape_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exports = dir.path().join("exports");
        let orchestrator = orchestrator_with(
            Arc::new(ScriptedGenerator::ok("x")),
            None,
            Arc::new(FixedCapture(100, 100)),
            &exports,
        );

        orchestrator.set_personal_field(PersonalField::Name, "AC/DC");
        let receipt = orchestrator.export(PathBuf::from("preview.png")).await.unwrap();
        assert_eq!(receipt.filename, "AC_DC.pdf");
        assert_eq!(receipt.path.parent(), Some(exports.as_path()));
        assert!(receipt.path.is_file());

        let escaped = dir.path().join("escaped");
        orchestrator.set_personal_field(PersonalField::Name, &escaped.display().to_string());
        let receipt = orchestrator.export(PathBuf::from("preview.png")).await.unwrap();
        assert_eq!(receipt.path.parent(), Some(exports.as_path()));
        assert!(receipt.path.is_file());
        assert!(!dir.path().join("escaped.pdf").exists());
    }

    #[tokio::test]
    async fn test_aborted_export_holds_flag_until_work_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let capture = Arc::new(SlowCapture::default());
        let orchestrator = Arc::new(orchestrator_with(
            Arc::new(ScriptedGenerator::ok("x")),
            None,
            capture.clone(),
            dir.path(),
        ));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.export(PathBuf::from("preview.png")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        // The capture is still running on the blocking pool.
        assert!(orchestrator.is_exporting());
        let err = orchestrator.export(PathBuf::from("preview.png")).await.unwrap_err();
        assert!(matches!(err, ExportError::InProgress));

        for _ in 0..250 {
            if !orchestrator.is_exporting() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!orchestrator.is_exporting());
        assert!(dir.path().join("Jane_Doe.pdf").is_file());

        orchestrator.export(PathBuf::from("preview.png")).await.unwrap();
        assert_eq!(capture.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_export_clears_flag() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(
            Arc::new(ScriptedGenerator::ok("x")),
            None,
            Arc::new(FailingCapture),
            dir.path(),
        );
        let err = orchestrator.export(PathBuf::from("preview.png")).await.unwrap_err();
        assert!(matches!(err, ExportError::ExportFailed(_)));
        assert!(!orchestrator.is_exporting());
    }

    #[tokio::test]
    async fn test_export_rejected_while_running() {
        let orchestrator = simple(Arc::new(ScriptedGenerator::ok("x")), None);
        orchestrator.state.lock().exporting = true;
        let err = orchestrator.export(PathBuf::from("preview.png")).await.unwrap_err();
        assert!(matches!(err, ExportError::InProgress));
        // The rejected request must not clear the running export's flag.
        assert!(orchestrator.is_exporting());
    }
}
