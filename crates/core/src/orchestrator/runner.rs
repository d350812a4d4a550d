//! Batch orchestrator implementation.
//!
//! One engine, one in-flight slot: the batch loop awaits each conversion
//! before claiming the next item, so at most one item is ever `converting`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::catalogue;
use crate::download::{SavedFile, Saver};
use crate::engine::{Engine, EngineLoader};
use crate::invoker::{self, ConversionRequest, ConvertedFile};

use super::config::OrchestratorConfig;
use super::types::{
    BatchEvent, BatchReport, ConversionItem, DownloadFailure, DownloadReport, ItemId, ItemStatus,
    OrchestratorError, UploadOutcome, UploadedFile,
};

/// Mutable batch state, owned exclusively by the orchestrator.
#[derive(Default)]
struct BatchState {
    items: Vec<ConversionItem>,
    progress: u8,
    /// Bumped by every reset; a batch loop from an older epoch stops writing.
    epoch: u64,
}

impl BatchState {
    fn find(&self, id: ItemId) -> Option<&ConversionItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut ConversionItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

/// What the batch loop found when it went to claim an item.
enum Claim {
    /// The batch was reset.
    Stale,
    /// Removed, or no longer ready.
    Skipped,
    Job {
        file_name: String,
        media_type: String,
        data: Arc<[u8]>,
        target: String,
    },
}

/// Clears the converting flag when the batch ends, however it ends.
struct ConvertingGuard<'a>(&'a AtomicBool);

impl Drop for ConvertingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Puts a claimed item back to `ready` if the batch is dropped while it is
/// in the engine. Disarmed once the outcome is recorded.
struct ClaimGuard {
    state: Arc<RwLock<BatchState>>,
    id: ItemId,
    epoch: u64,
    armed: bool,
}

impl ClaimGuard {
    fn release(state: &mut BatchState, id: ItemId, epoch: u64) {
        if state.epoch != epoch {
            return;
        }
        if let Some(item) = state.find_mut(id) {
            if item.is_converting() {
                warn!("Conversion of {} was cancelled, item is ready again", item.file_name);
                item.status = ItemStatus::Ready;
                item.started_at = None;
            }
        }
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (id, epoch) = (self.id, self.epoch);
        if let Ok(mut state) = self.state.try_write() {
            Self::release(&mut state, id, epoch);
            return;
        }
        // Lock is busy; finish the release on the runtime.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let state = Arc::clone(&self.state);
            handle.spawn(async move {
                Self::release(&mut *state.write().await, id, epoch);
            });
        }
    }
}

/// Drives uploaded items through selection, conversion and download.
pub struct BatchOrchestrator<E: Engine + 'static> {
    loader: Arc<EngineLoader<E>>,
    state: Arc<RwLock<BatchState>>,
    converting: AtomicBool,
    next_id: AtomicU64,
    events: broadcast::Sender<BatchEvent>,
}

impl<E: Engine + 'static> BatchOrchestrator<E> {
    /// Create a new orchestrator around a shared engine loader.
    pub fn new(config: OrchestratorConfig, loader: Arc<EngineLoader<E>>) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            loader,
            state: Arc::new(RwLock::new(BatchState::default())),
            converting: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// The engine loader this orchestrator converts with.
    pub fn loader(&self) -> &Arc<EngineLoader<E>> {
        &self.loader
    }

    /// Subscribe to batch events.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: BatchEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Adds the accepted files as pending items.
    ///
    /// Rejected files are reported once for the whole call and never become items.
    pub async fn upload(&self, files: Vec<UploadedFile>) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();
        let mut accepted = Vec::new();

        for file in files {
            if catalogue::accepts(&file.media_type, &file.name) {
                let id = ItemId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
                outcome.added.push(id);
                accepted.push(ConversionItem::from_upload(id, file));
            } else {
                debug!("Rejected upload {} ({})", file.name, file.media_type);
                outcome.rejected.push(file.name);
            }
        }

        if !accepted.is_empty() {
            self.state.write().await.items.extend(accepted);
            info!("Added {} file(s) to the batch", outcome.added.len());
            self.emit(BatchEvent::ItemsAdded {
                ids: outcome.added.clone(),
            });
        }

        if !outcome.rejected.is_empty() {
            warn!("Rejected {} file(s): {}", outcome.rejected.len(), outcome.rejected.join(", "));
            self.emit(BatchEvent::UploadRejected {
                file_names: outcome.rejected.clone(),
            });
        }

        outcome
    }

    /// Assigns a target extension, moving the item to `ready`.
    pub async fn select_target(&self, id: ItemId, target: &str) -> Result<(), OrchestratorError> {
        let target = catalogue::normalize(target);
        if !catalogue::is_selectable(&target) {
            return Err(OrchestratorError::UnsupportedTarget(target));
        }

        {
            let mut state = self.state.write().await;
            let item = state.find_mut(id).ok_or(OrchestratorError::ItemNotFound(id))?;
            if !matches!(item.status, ItemStatus::Pending | ItemStatus::Ready) {
                return Err(OrchestratorError::invalid_state(
                    id,
                    "pending or ready",
                    &item.status,
                ));
            }
            item.target = Some(target.clone());
            item.status = ItemStatus::Ready;
        }

        debug!("Item {} will convert to {}", id, target);
        self.emit(BatchEvent::TargetSelected { id, target });
        Ok(())
    }

    /// Removes an item that is not in the engine.
    pub async fn remove(&self, id: ItemId) -> Result<ConversionItem, OrchestratorError> {
        let removed = {
            let mut state = self.state.write().await;
            let index = state
                .items
                .iter()
                .position(|i| i.id == id)
                .ok_or(OrchestratorError::ItemNotFound(id))?;
            if state.items[index].is_converting() {
                return Err(OrchestratorError::ItemConverting(id));
            }
            state.items.remove(index)
        };

        info!("Removed {} ({})", removed.file_name, id);
        self.emit(BatchEvent::ItemRemoved { id });
        Ok(removed)
    }

    /// Clears every item and the progress, whatever is going on.
    ///
    /// A running batch stops at the next item boundary; the result of the item
    /// it is waiting on is dropped.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            state.items.clear();
            state.progress = 0;
            state.epoch += 1;
        }
        info!("Batch reset");
        self.emit(BatchEvent::Reset);
    }

    /// Snapshot of all items, in insertion order.
    pub async fn items(&self) -> Vec<ConversionItem> {
        self.state.read().await.items.clone()
    }

    /// Snapshot of one item.
    pub async fn item(&self, id: ItemId) -> Option<ConversionItem> {
        self.state.read().await.find(id).cloned()
    }

    /// Percent of the current (or last) batch that has finished.
    pub async fn progress(&self) -> u8 {
        self.state.read().await.progress
    }

    /// Whether a batch is running.
    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::SeqCst)
    }

    /// Every item is ready and no batch is running.
    pub async fn can_convert(&self) -> bool {
        if self.is_converting() {
            return false;
        }
        let state = self.state.read().await;
        !state.items.is_empty() && state.items.iter().all(ConversionItem::is_ready)
    }

    /// Every item has been converted.
    pub async fn all_converted(&self) -> bool {
        let state = self.state.read().await;
        !state.items.is_empty() && state.items.iter().all(|i| i.result().is_some())
    }

    /// Converts every item, one at a time, in insertion order.
    ///
    /// Waits for the engine first. A failing item is recorded and the batch
    /// moves on. If the returned future is dropped mid-item, that item goes
    /// back to `ready`.
    pub async fn convert(&self) -> Result<BatchReport, OrchestratorError> {
        if self.converting.swap(true, Ordering::SeqCst) {
            return Err(OrchestratorError::BatchInProgress);
        }
        let _guard = ConvertingGuard(&self.converting);

        let engine = self.loader.load().await.map_err(|e| {
            error!("Cannot convert, engine unavailable: {}", e);
            OrchestratorError::EngineInit(e)
        })?;

        let (ids, epoch) = {
            let mut state = self.state.write().await;
            if state.items.is_empty() || !state.items.iter().all(ConversionItem::is_ready) {
                return Err(OrchestratorError::NotReady);
            }
            state.progress = 0;
            let ids: Vec<ItemId> = state.items.iter().map(|i| i.id).collect();
            (ids, state.epoch)
        };

        let total = ids.len();
        let mut report = BatchReport {
            total,
            ..BatchReport::default()
        };

        info!("Starting batch of {} item(s)", total);
        self.emit(BatchEvent::BatchStarted { total });

        for (index, id) in ids.into_iter().enumerate() {
            match self.claim(id, epoch).await {
                Claim::Stale => {
                    info!("Batch reset, stopping after {} of {} item(s)", index, total);
                    return Ok(report);
                }
                Claim::Skipped => {
                    debug!("Item {} left the batch, skipping", id);
                }
                Claim::Job {
                    file_name,
                    media_type,
                    data,
                    target,
                } => {
                    let mut claimed = ClaimGuard {
                        state: Arc::clone(&self.state),
                        id,
                        epoch,
                        armed: true,
                    };
                    self.emit(BatchEvent::ItemStarted {
                        id,
                        file_name: file_name.clone(),
                    });

                    let request = ConversionRequest {
                        file_name: &file_name,
                        media_type: &media_type,
                        data: &data,
                        target: &target,
                    };
                    let outcome = invoker::convert(engine.as_ref(), request)
                        .await
                        .map_err(|e| e.to_string());

                    let recorded = self.finish(id, epoch, &file_name, outcome, &mut report).await;
                    claimed.armed = false;
                    if !recorded {
                        info!("Batch reset, dropping result for {}", file_name);
                        return Ok(report);
                    }
                }
            }

            if !self.record_progress(epoch, index + 1, total).await {
                return Ok(report);
            }
        }

        info!(
            "Batch finished: {} converted, {} failed",
            report.converted, report.failed
        );
        self.emit(BatchEvent::BatchFinished { report });
        Ok(report)
    }

    async fn claim(&self, id: ItemId, epoch: u64) -> Claim {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return Claim::Stale;
        }
        let Some(item) = state.find_mut(id) else {
            return Claim::Skipped;
        };
        let target = match (&item.status, &item.target) {
            (ItemStatus::Ready, Some(target)) => target.clone(),
            _ => return Claim::Skipped,
        };

        item.status = ItemStatus::Converting;
        item.started_at = Some(Utc::now());
        Claim::Job {
            file_name: item.file_name.clone(),
            media_type: item.media_type.clone(),
            data: Arc::clone(&item.data),
            target,
        }
    }

    /// Records the outcome; false if the batch was reset meanwhile.
    async fn finish(
        &self,
        id: ItemId,
        epoch: u64,
        file_name: &str,
        outcome: Result<ConvertedFile, String>,
        report: &mut BatchReport,
    ) -> bool {
        let event = {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return false;
            }
            let Some(item) = state.find_mut(id) else {
                return true;
            };
            item.finished_at = Some(Utc::now());

            match outcome {
                Ok(result) => {
                    report.converted += 1;
                    let output_name = result.output_name.clone();
                    item.status = ItemStatus::Converted { result };
                    BatchEvent::ItemConverted { id, output_name }
                }
                Err(message) => {
                    report.failed += 1;
                    warn!("Failed to convert {}: {}", file_name, message);
                    item.status = ItemStatus::Errored {
                        message: message.clone(),
                    };
                    BatchEvent::ItemFailed {
                        id,
                        file_name: file_name.to_string(),
                        message,
                    }
                }
            }
        };

        self.emit(event);
        true
    }

    /// Updates progress after an item; false if the batch was reset meanwhile.
    async fn record_progress(&self, epoch: u64, completed: usize, total: usize) -> bool {
        let percent = (completed * 100 / total) as u8;
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return false;
            }
            state.progress = percent;
        }

        self.emit(BatchEvent::Progress {
            completed,
            total,
            percent,
        });
        true
    }

    /// Saves one converted item.
    pub async fn download(
        &self,
        id: ItemId,
        saver: &dyn Saver,
    ) -> Result<SavedFile, OrchestratorError> {
        let result = {
            let state = self.state.read().await;
            let item = state.find(id).ok_or(OrchestratorError::ItemNotFound(id))?;
            item.result()
                .cloned()
                .ok_or(OrchestratorError::NotConverted(id))?
        };

        Ok(saver.save(&result).await?)
    }

    /// Saves every converted item, skipping the rest.
    pub async fn download_all(&self, saver: &dyn Saver) -> DownloadReport {
        let converted: Vec<(ItemId, ConvertedFile)> = {
            let state = self.state.read().await;
            state
                .items
                .iter()
                .filter_map(|i| i.result().map(|r| (i.id, r.clone())))
                .collect()
        };

        let mut report = DownloadReport::default();
        for (id, result) in converted {
            match saver.save(&result).await {
                Ok(saved) => report.saved.push(saved),
                Err(e) => {
                    warn!("Failed to save {}: {}", result.output_name, e);
                    report.failed.push(DownloadFailure {
                        id,
                        output_name: result.output_name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Saved {} file(s) via {}, {} failed",
            report.saved.len(),
            saver.name(),
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::testing::fixtures::{mov, png, uploaded, wav};
    use crate::testing::{MockEngine, MockSaver};
    use std::time::Duration;

    fn orchestrator(engine: MockEngine) -> BatchOrchestrator<MockEngine> {
        BatchOrchestrator::new(
            OrchestratorConfig::default(),
            Arc::new(EngineLoader::ready(engine)),
        )
    }

    async fn ready_all(orch: &BatchOrchestrator<MockEngine>, ids: &[ItemId], target: &str) {
        for id in ids {
            orch.select_target(*id, target).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_upload_creates_pending_items() {
        let orch = orchestrator(MockEngine::new());
        let outcome = orch.upload(vec![png("photo.png"), wav("song.wav")]).await;

        assert_eq!(outcome.added.len(), 2);
        assert!(outcome.rejected.is_empty());

        let items = orch.items().await;
        assert_eq!(items.len(), 2);
        for item in &items {
            assert!(matches!(item.status, ItemStatus::Pending));
            assert!(item.target.is_none());
        }
        assert_eq!(items[0].file_name, "photo.png");
    }

    #[tokio::test]
    async fn test_upload_rejects_unaccepted_files() {
        let orch = orchestrator(MockEngine::new());
        let mut events = orch.subscribe();

        let outcome = orch
            .upload(vec![
                uploaded("notes.txt", "text/plain", b"hi"),
                uploaded("doc.pdf", "application/pdf", b"%PDF"),
            ])
            .await;

        assert!(outcome.added.is_empty());
        assert_eq!(outcome.rejected, vec!["notes.txt", "doc.pdf"]);
        assert!(orch.items().await.is_empty());

        let event = events.recv().await.unwrap();
        assert!(matches!(event, BatchEvent::UploadRejected { .. }));
        assert!(event.notification().is_some());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_select_target_transitions() {
        let orch = orchestrator(MockEngine::new());
        let id = orch.upload(vec![png("photo.png")]).await.added[0];

        orch.select_target(id, " JPG ").await.unwrap();
        let item = orch.item(id).await.unwrap();
        assert!(item.is_ready());
        assert_eq!(item.target.as_deref(), Some("jpg"));

        // Reselection stays ready with the new target.
        orch.select_target(id, "webp").await.unwrap();
        let item = orch.item(id).await.unwrap();
        assert!(item.is_ready());
        assert_eq!(item.target.as_deref(), Some("webp"));
    }

    #[tokio::test]
    async fn test_select_unknown_target() {
        let orch = orchestrator(MockEngine::new());
        let id = orch.upload(vec![png("photo.png")]).await.added[0];

        let err = orch.select_target(id, "docx").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::UnsupportedTarget(ref t) if t == "docx"));
        assert!(matches!(orch.item(id).await.unwrap().status, ItemStatus::Pending));

        let err = orch.select_target(ItemId::new(99), "jpg").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_can_convert_requires_all_ready() {
        let orch = orchestrator(MockEngine::new());
        assert!(!orch.can_convert().await);

        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        orch.select_target(ids[0], "jpg").await.unwrap();
        assert!(!orch.can_convert().await);
        assert!(matches!(orch.convert().await, Err(OrchestratorError::NotReady)));

        orch.select_target(ids[1], "gif").await.unwrap();
        assert!(orch.can_convert().await);
    }

    #[tokio::test]
    async fn test_convert_photo_to_jpg() {
        let engine = MockEngine::new();
        let orch = orchestrator(engine.clone());
        let id = orch
            .upload(vec![uploaded("photo.png", "image/png", &vec![7u8; 2_097_152])])
            .await
            .added[0];
        orch.select_target(id, "jpg").await.unwrap();

        let report = orch.convert().await.unwrap();
        assert_eq!(report, BatchReport { total: 1, converted: 1, failed: 0 });

        let item = orch.item(id).await.unwrap();
        let result = item.result().unwrap();
        assert_eq!(result.output_name, "photo.jpg");
        assert_eq!(result.blob.media_type(), "image");
        assert!(result.blob.url().starts_with("blob:"));
        assert!(item.started_at.is_some());
        assert!(item.finished_at.is_some());

        assert_eq!(orch.progress().await, 100);
        assert!(orch.all_converted().await);
        assert!(!orch.is_converting());

        let runs = engine.recorded_runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].args.last().unwrap(), "photo.jpg");
        assert!(engine.workspace_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let engine = MockEngine::new();
        engine.fail_on("clip.mov", "moov atom not found").await;
        let orch = orchestrator(engine.clone());
        let mut events = orch.subscribe();

        let ids = orch
            .upload(vec![mov("clip.mov"), png("photo.png")])
            .await
            .added;
        orch.select_target(ids[0], "mp4").await.unwrap();
        orch.select_target(ids[1], "jpg").await.unwrap();

        let report = orch.convert().await.unwrap();
        assert_eq!(report.converted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(orch.progress().await, 100);

        let clip = orch.item(ids[0]).await.unwrap();
        assert_eq!(clip.error(), Some("moov atom not found"));
        assert!(orch.item(ids[1]).await.unwrap().result().is_some());

        let mut notification = None;
        while let Ok(event) = events.try_recv() {
            if let BatchEvent::ItemFailed { .. } = event {
                notification = event.notification();
            }
        }
        let notification = notification.unwrap();
        assert_eq!(notification.title, "Error converting your file");
        assert_eq!(notification.description, "moov atom not found");
    }

    #[tokio::test]
    async fn test_batch_leaves_only_terminal_items() {
        let engine = MockEngine::new();
        engine.fail_on("b.wav", "Invalid data found when processing input").await;
        let orch = orchestrator(engine);

        let ids = orch
            .upload(vec![wav("a.wav"), wav("b.wav"), wav("c.wav")])
            .await
            .added;
        ready_all(&orch, &ids, "mp3").await;
        orch.convert().await.unwrap();

        for item in orch.items().await {
            assert!(item.status.is_terminal(), "{} is {}", item.file_name, item.status.state_name());
        }
        assert!(!orch.all_converted().await);
    }

    #[tokio::test]
    async fn test_conversions_are_sequential_and_ordered() {
        let engine = MockEngine::new();
        engine.set_run_duration(Duration::from_millis(10)).await;
        let orch = orchestrator(engine.clone());

        let ids = orch
            .upload(vec![png("one.png"), png("two.png"), png("three.png")])
            .await
            .added;
        ready_all(&orch, &ids, "bmp").await;
        orch.convert().await.unwrap();

        assert_eq!(engine.max_concurrent_runs(), 1);
        let outputs: Vec<String> = engine
            .recorded_runs()
            .await
            .into_iter()
            .filter_map(|r| r.args.last().cloned())
            .collect();
        assert_eq!(outputs, vec!["one.bmp", "two.bmp", "three.bmp"]);
    }

    #[tokio::test]
    async fn test_progress_events() {
        let orch = orchestrator(MockEngine::new());
        let mut events = orch.subscribe();
        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;
        orch.convert().await.unwrap();

        let mut percents = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let BatchEvent::Progress { percent, .. } = event {
                percents.push(percent);
            }
        }
        assert_eq!(percents, vec![50, 100]);
    }

    #[tokio::test]
    async fn test_second_convert_is_rejected() {
        let engine = MockEngine::new();
        engine.set_run_duration(Duration::from_millis(100)).await;
        let orch = Arc::new(orchestrator(engine));
        let id = orch.upload(vec![png("a.png")]).await.added[0];
        orch.select_target(id, "jpg").await.unwrap();

        let running = Arc::clone(&orch);
        let batch = tokio::spawn(async move { running.convert().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(orch.is_converting());
        assert!(!orch.can_convert().await);
        assert!(matches!(
            orch.convert().await,
            Err(OrchestratorError::BatchInProgress)
        ));
        assert!(matches!(
            orch.remove(id).await,
            Err(OrchestratorError::ItemConverting(_))
        ));

        batch.await.unwrap().unwrap();
        assert!(!orch.is_converting());
    }

    #[tokio::test]
    async fn test_remove_leaves_other_items_untouched() {
        let orch = orchestrator(MockEngine::new());
        let ids = orch
            .upload(vec![png("a.png"), png("b.png"), png("c.png")])
            .await
            .added;
        orch.select_target(ids[0], "jpg").await.unwrap();

        let removed = orch.remove(ids[1]).await.unwrap();
        assert_eq!(removed.file_name, "b.png");

        let items = orch.items().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ready());
        assert!(matches!(items[1].status, ItemStatus::Pending));

        assert!(matches!(
            orch.remove(ids[1]).await,
            Err(OrchestratorError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_during_batch_skips_item() {
        let engine = MockEngine::new();
        engine.set_run_duration(Duration::from_millis(50)).await;
        let orch = Arc::new(orchestrator(engine.clone()));
        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;

        let running = Arc::clone(&orch);
        let batch = tokio::spawn(async move { running.convert().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        orch.remove(ids[1]).await.unwrap();

        let report = batch.await.unwrap().unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.converted, 1);
        assert_eq!(engine.run_count().await, 1);
        assert_eq!(orch.progress().await, 100);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let orch = orchestrator(MockEngine::new());
        let ids = orch.upload(vec![png("a.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;
        orch.convert().await.unwrap();
        assert_eq!(orch.progress().await, 100);

        orch.reset().await;
        assert!(orch.items().await.is_empty());
        assert_eq!(orch.progress().await, 0);
        assert!(!orch.can_convert().await);
    }

    #[tokio::test]
    async fn test_dropped_batch_releases_item() {
        let engine = MockEngine::new();
        engine.set_run_duration(Duration::from_millis(50)).await;
        let orch = orchestrator(engine);
        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;

        let dropped = tokio::time::timeout(Duration::from_millis(10), orch.convert()).await;
        assert!(dropped.is_err());

        assert!(!orch.is_converting());
        let item = orch.item(ids[0]).await.unwrap();
        assert!(item.is_ready());
        assert!(item.started_at.is_none());
        assert!(orch.can_convert().await);

        orch.remove(ids[0]).await.unwrap();
        let report = orch.convert().await.unwrap();
        assert_eq!(report.converted, 1);
    }

    #[tokio::test]
    async fn test_reset_during_batch_stops_loop() {
        let engine = MockEngine::new();
        engine.set_run_duration(Duration::from_millis(50)).await;
        let orch = Arc::new(orchestrator(engine.clone()));
        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;

        let running = Arc::clone(&orch);
        let batch = tokio::spawn(async move { running.convert().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        orch.reset().await;

        batch.await.unwrap().unwrap();
        assert!(orch.items().await.is_empty());
        assert_eq!(orch.progress().await, 0);
        assert_eq!(engine.run_count().await, 1);
    }

    #[tokio::test]
    async fn test_errored_items_cannot_be_retargeted() {
        let engine = MockEngine::new();
        engine.fail_on("clip.mov", "boom").await;
        let orch = orchestrator(engine);
        let id = orch.upload(vec![mov("clip.mov")]).await.added[0];
        orch.select_target(id, "mp4").await.unwrap();
        orch.convert().await.unwrap();

        let err = orch.select_target(id, "webm").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_engine_init_failure_blocks_convert() {
        let loader = Arc::new(EngineLoader::<MockEngine>::new(async {
            Err(EngineError::init_failed("ffmpeg not found"))
        }));
        let orch = BatchOrchestrator::new(OrchestratorConfig::default(), loader);
        let id = orch.upload(vec![png("a.png")]).await.added[0];
        orch.select_target(id, "jpg").await.unwrap();

        let err = orch.convert().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::EngineInit(_)));
        assert!(orch.item(id).await.unwrap().is_ready());
        assert_eq!(orch.progress().await, 0);
        assert!(!orch.is_converting());

        // Cached: the second attempt fails the same way.
        assert!(matches!(
            orch.convert().await,
            Err(OrchestratorError::EngineInit(_))
        ));
    }

    #[tokio::test]
    async fn test_download_single_and_all() {
        let engine = MockEngine::new();
        engine.fail_on("clip.mov", "boom").await;
        let orch = orchestrator(engine);
        let saver = MockSaver::new();

        let ids = orch
            .upload(vec![png("photo.png"), mov("clip.mov"), wav("song.wav")])
            .await
            .added;
        orch.select_target(ids[0], "jpg").await.unwrap();
        orch.select_target(ids[1], "mp4").await.unwrap();
        orch.select_target(ids[2], "mp3").await.unwrap();

        assert!(matches!(
            orch.download(ids[0], &saver).await,
            Err(OrchestratorError::NotConverted(_))
        ));

        orch.convert().await.unwrap();

        let saved = orch.download(ids[0], &saver).await.unwrap();
        assert_eq!(saved.output_name, "photo.jpg");

        let report = orch.download_all(&saver).await;
        let names: Vec<&str> = report.saved.iter().map(|s| s.output_name.as_str()).collect();
        assert_eq!(names, vec!["photo.jpg", "song.mp3"]);
        assert!(report.failed.is_empty());
        assert_eq!(saver.saved_count().await, 3);
    }

    #[tokio::test]
    async fn test_download_all_reports_save_failures() {
        let orch = orchestrator(MockEngine::new());
        let saver = MockSaver::new();
        saver.fail_on("b.jpg").await;

        let ids = orch.upload(vec![png("a.png"), png("b.png")]).await.added;
        ready_all(&orch, &ids, "jpg").await;
        orch.convert().await.unwrap();

        let report = orch.download_all(&saver).await;
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, ids[1]);
    }
}
