use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use campus_security::SecurityContext;
use futures::future::join_all;
use parking_lot::Mutex;
use time::{Date, OffsetDateTime};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::client::AttendanceClientV1;
use crate::errors::AttendanceError;
use crate::models::{AttendanceQuery, AttendanceStatus, NewAttendance};

use super::error::SyncError;
use super::roster::ClassRoster;
use super::state::{AttendanceState, Changes};

type Clock = Arc<dyn Fn() -> Date + Send + Sync>;

/// What the roll-call screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSnapshot {
    pub date: Option<Date>,
    pub attendance: BTreeMap<String, bool>,
    pub saved_attendance: BTreeMap<String, bool>,
    pub has_unsaved_changes: bool,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub date: Date,
    pub loaded_classes: Vec<String>,
    pub failed_classes: Vec<String>,
    pub records: usize,
}

/// How a save reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePath {
    /// Nothing differed from the saved state.
    Nothing,
    Batch,
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub date: Date,
    pub path: SavePath,
    pub written: usize,
}

/// Attendance state of one roll-call session.
///
/// Shared behind an `Arc` by the view that edits it; every mutation
/// publishes a fresh [`AttendanceSnapshot`] to receivers of [`AttendanceSync::subscribe`].
pub struct AttendanceSync {
    client: Arc<dyn AttendanceClientV1>,
    ctx: SecurityContext,
    roster: Vec<ClassRoster>,
    state: Mutex<AttendanceState>,
    saving: AtomicBool,
    updates: watch::Sender<AttendanceSnapshot>,
    today: Clock,
}

impl fmt::Debug for AttendanceSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttendanceSync")
            .field("ctx", &self.ctx)
            .field("roster", &self.roster)
            .field("state", &*self.state.lock())
            .field("saving", &self.saving.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag when a save ends, however it ends.
struct SaveLatch<'a>(&'a AtomicBool);

impl Drop for SaveLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AttendanceSync {
    #[must_use]
    pub fn new(
        client: Arc<dyn AttendanceClientV1>,
        ctx: SecurityContext,
        roster: Vec<ClassRoster>,
    ) -> Self {
        let (updates, _) = watch::channel(AttendanceSnapshot::default());
        Self {
            client,
            ctx,
            roster,
            state: Mutex::new(AttendanceState::default()),
            saving: AtomicBool::new(false),
            updates,
            today: Arc::new(|| OffsetDateTime::now_utc().date()),
        }
    }

    /// Replace the clock used to date saves that do not name a date.
    #[must_use]
    pub fn with_clock(mut self, today: impl Fn() -> Date + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    #[must_use]
    pub fn roster(&self) -> &[ClassRoster] {
        &self.roster
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AttendanceSnapshot> {
        self.updates.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> AttendanceSnapshot {
        let state = self.state.lock();
        AttendanceSnapshot {
            date: state.date(),
            attendance: state.attendance().clone(),
            saved_attendance: state.saved().clone(),
            has_unsaved_changes: state.has_unsaved_changes(),
            saving: self.saving.load(Ordering::Acquire),
        }
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.lock().has_unsaved_changes()
    }

    /// Students whose working value differs from the saved one.
    #[must_use]
    pub fn pending_changes(&self) -> Changes {
        self.state.lock().deltas(&Changes::new())
    }

    /// Rebuild both views from the store for `date`.
    ///
    /// Classes are fetched concurrently. A class whose fetch fails is logged
    /// and left out; the rest still load.
    #[instrument(skip(self), fields(classes = self.roster.len()))]
    pub async fn load(&self, date: Date) -> LoadReport {
        let fetches = self.roster.iter().map(|class| {
            let query = AttendanceQuery::for_class(class.class_id.clone(), date);
            async move { (class.class_id.as_str(), self.client.query(&self.ctx, query).await) }
        });
        let results = join_all(fetches).await;

        let mut report = LoadReport {
            date,
            loaded_classes: Vec::new(),
            failed_classes: Vec::new(),
            records: 0,
        };
        {
            let mut state = self.state.lock();
            state.reset(date);
            for (class_id, result) in results {
                match result {
                    Ok(records) => {
                        report.records += records.len();
                        for record in &records {
                            state.merge_loaded(&record.student_id, record.status.is_present());
                        }
                        report.loaded_classes.push(class_id.to_owned());
                    }
                    Err(e) => {
                        warn!(class_id, error = %e, "attendance fetch failed, class left empty");
                        report.failed_classes.push(class_id.to_owned());
                    }
                }
            }
        }
        self.publish();

        info!(
            records = report.records,
            failed = report.failed_classes.len(),
            "attendance loaded"
        );
        report
    }

    /// Toggle one student locally. Nothing is written until [`Self::save`].
    pub fn update_attendance(&self, student_id: &str, is_present: bool) {
        self.state.lock().set(student_id, is_present);
        self.publish();
    }

    /// Mark every student of `class_id` present, or every known student when
    /// no class is given. Returns how many students were marked.
    pub fn mark_all_present(&self, class_id: Option<&str>) -> usize {
        let students: Vec<String> = match class_id {
            Some(class_id) => self
                .roster
                .iter()
                .filter(|class| class.class_id == class_id)
                .flat_map(|class| class.student_ids.iter().cloned())
                .collect(),
            None => {
                let state = self.state.lock();
                let mut all: Vec<String> = self
                    .roster
                    .iter()
                    .flat_map(|class| class.student_ids.iter().cloned())
                    .chain(state.attendance().keys().cloned())
                    .collect();
                all.sort_unstable();
                all.dedup();
                all
            }
        };

        {
            let mut state = self.state.lock();
            for student_id in &students {
                state.set(student_id, true);
            }
        }
        self.publish();
        students.len()
    }

    /// Persist every student whose effective status differs from the saved one.
    ///
    /// `changes` are applied to the working view first, so they stay visible
    /// even when the write fails. `date` defaults to today, read once. The
    /// saved view only advances if no [`Self::load`] moved the session to
    /// another date while the write was running.
    ///
    /// # Errors
    /// - [`SyncError::SaveInFlight`] if another save has not finished
    /// - [`SyncError::DateMismatch`] if the session is loaded for a different date
    /// - [`SyncError::Batch`] if the batch write was rejected for a non-transient reason
    /// - [`SyncError::PartialSave`] if the per-record fallback did not write everything
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    pub async fn save(&self, changes: &Changes, date: Option<Date>) -> Result<SaveReport, SyncError> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("save rejected, another save is running");
            return Err(SyncError::SaveInFlight);
        }
        let latch = SaveLatch(&self.saving);
        let result = self.write_deltas(changes, date).await;
        drop(latch);
        self.publish();
        result
    }

    async fn write_deltas(
        &self,
        changes: &Changes,
        date: Option<Date>,
    ) -> Result<SaveReport, SyncError> {
        let date = date.unwrap_or_else(|| (self.today)());
        let deltas = {
            let mut state = self.state.lock();
            state
                .claim_date(date)
                .map_err(|loaded| SyncError::DateMismatch {
                    loaded,
                    requested: date,
                })?;
            state.apply(changes);
            state.deltas(&Changes::new())
        };
        self.publish();

        if deltas.is_empty() {
            debug!("nothing to save");
            return Ok(SaveReport {
                date,
                path: SavePath::Nothing,
                written: 0,
            });
        }

        let records: Vec<NewAttendance> = deltas
            .iter()
            .map(|(student_id, is_present)| {
                NewAttendance::new(
                    student_id.clone(),
                    date,
                    AttendanceStatus::from_present(*is_present),
                )
                .with_class(self.class_of(student_id))
            })
            .collect();

        let report = match self.client.upsert_batch(&self.ctx, records.clone()).await {
            Ok(saved) => {
                info!(count = saved.len(), "attendance saved in one batch");
                SaveReport {
                    date,
                    path: SavePath::Batch,
                    written: saved.len(),
                }
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, count = records.len(), "batch save failed, saving records one by one");
                let written = self.save_individually(records).await?;
                SaveReport {
                    date,
                    path: SavePath::Individual,
                    written,
                }
            }
            Err(e) => return Err(SyncError::Batch(e)),
        };

        if !self.state.lock().mark_saved(date, &deltas) {
            debug!(%date, "session moved to another date during save, saved view left as loaded");
        }
        Ok(report)
    }

    async fn save_individually(&self, records: Vec<NewAttendance>) -> Result<usize, SyncError> {
        let attempted = records.len();
        let writes = records.into_iter().map(|record| async move {
            let student_id = record.student_id.clone();
            (student_id, self.client.upsert_one(&self.ctx, record).await)
        });

        let failed: Vec<(String, AttendanceError)> = join_all(writes)
            .await
            .into_iter()
            .filter_map(|(student_id, result)| result.err().map(|e| (student_id, e)))
            .collect();

        if failed.is_empty() {
            info!(count = attempted, "attendance saved record by record");
            Ok(attempted)
        } else {
            warn!(failed = failed.len(), attempted, "some attendance records were not saved");
            Err(SyncError::PartialSave { attempted, failed })
        }
    }

    fn class_of(&self, student_id: &str) -> Option<String> {
        self.roster
            .iter()
            .find(|class| class.contains(student_id))
            .map(|class| class.class_id.clone())
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot);
    }
}
