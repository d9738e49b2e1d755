use crate::core::loader::ReferenceDataLoader;
use crate::core::session::{FormEvent, FormSession};
use crate::domain::model::{Ack, FileUpload};
use crate::domain::ports::{ReferenceSource, Submitter};
use crate::utils::error::{IntakeError, Result, SubmitError};
use std::path::Path;
use std::sync::Arc;

/// Summary of one replayed session.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub events_applied: usize,
    pub events_skipped: usize,
    pub submissions: usize,
    pub last_outcome: Option<std::result::Result<Ack, SubmitError>>,
}

/// 驅動表單會話：載入參照資料、重播事件、送出
pub struct IntakeEngine<S: ReferenceSource> {
    loader: ReferenceDataLoader<S>,
    submitter: Box<dyn Submitter>,
}

impl<S: ReferenceSource> IntakeEngine<S> {
    pub fn new(loader: ReferenceDataLoader<S>, submitter: Box<dyn Submitter>) -> Self {
        Self { loader, submitter }
    }

    /// Loads reference data into the session. On failure the dropdowns stay
    /// disabled and the session carries an error notice.
    pub async fn load(&self, session: &mut FormSession) -> Result<()> {
        match self.loader.load().await {
            Ok(data) => {
                session.load_reference_data(Arc::new(data));
                Ok(())
            }
            Err(e) => {
                session.record_load_failure(&e);
                Err(e)
            }
        }
    }

    /// One full submit cycle through the session's IDLE/SUBMITTING guard.
    pub async fn submit(&self, session: &mut FormSession) -> std::result::Result<Ack, SubmitError> {
        let payload = session.begin_submit()?;
        tracing::info!(
            "📤 Submitting {} fields and {} files via {}",
            payload.fields.len(),
            payload.files.len(),
            self.submitter.name()
        );
        let outcome = self.submitter.submit(&payload).await;
        if self.submitter.is_dry_run() && outcome.is_ok() {
            session.finish_dry_run();
        } else {
            session.finish_submit(&outcome);
        }
        outcome
    }

    /// Applies events in order. `File` events read the file from disk,
    /// `Submit` events run a submit cycle.
    pub async fn replay(&self, session: &mut FormSession, events: &[FormEvent]) -> IntakeReport {
        let mut report = IntakeReport::default();

        for event in events {
            let applied = match event {
                FormEvent::File { field, path } => match read_upload(path).await {
                    Ok(upload) => session.attach_file(field, upload),
                    Err(e) => {
                        tracing::warn!("Could not read upload for '{}': {}", field, e);
                        false
                    }
                },
                FormEvent::Submit => {
                    let outcome = self.submit(session).await;
                    report.submissions += 1;
                    let applied = outcome.is_ok();
                    report.last_outcome = Some(outcome);
                    applied
                }
                other => session.handle(other),
            };

            if applied {
                report.events_applied += 1;
            } else {
                report.events_skipped += 1;
            }
        }

        report
    }

    /// Load, replay, then submit once if the events never did.
    pub async fn run(&self, session: &mut FormSession, events: &[FormEvent]) -> Result<IntakeReport> {
        tracing::info!("🚀 Starting intake session with {} events", events.len());

        self.load(session).await?;

        let mut report = self.replay(session, events).await;
        if report.submissions == 0 {
            let outcome = self.submit(session).await;
            report.submissions += 1;
            report.last_outcome = Some(outcome);
        }

        tracing::info!(
            "🏁 Intake finished: {} applied, {} skipped, {} submission(s)",
            report.events_applied,
            report.events_skipped,
            report.submissions
        );

        match report.last_outcome.as_ref() {
            Some(Err(e)) => Err(IntakeError::SubmissionError(e.clone())),
            _ => Ok(report),
        }
    }
}

/// Reads a local file into an upload, guessing the MIME type from its extension.
pub async fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = FileUpload::mime_from_extension(&file_name);
    Ok(FileUpload::new(file_name, mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::DataLayout;
    use crate::core::schema::FormSchema;
    use crate::core::session::SessionOptions;
    use crate::domain::model::FormPayload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct FailingSource;

    impl ReferenceSource for FailingSource {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
            Err(IntakeError::DataLoadError {
                resource: name.to_string(),
                message: "HTTP error! status: 503".to_string(),
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    struct CountingSubmitter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Submitter for CountingSubmitter {
        async fn submit(&self, _payload: &FormPayload) -> std::result::Result<Ack, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Ack { message: None })
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_load_failure_leaves_notice_and_skips_submit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = IntakeEngine::new(
            ReferenceDataLoader::new(FailingSource, DataLayout::Split),
            Box::new(CountingSubmitter { calls: calls.clone() }),
        );
        let mut session = FormSession::new(FormSchema::udcpr(), SessionOptions::default());

        let result = engine.run(&mut session, &[]).await;

        assert!(matches!(result, Err(IntakeError::DataLoadError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(session.dropdown("zone").unwrap().is_disabled());
        assert!(session.notices()[0].message.starts_with("Failed to load form data"));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_submitter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = IntakeEngine::new(
            ReferenceDataLoader::new(FailingSource, DataLayout::Split),
            Box::new(CountingSubmitter { calls: calls.clone() }),
        );
        let mut session = FormSession::new(FormSchema::udcpr(), SessionOptions::default());

        let report = engine.replay(&mut session, &[FormEvent::Submit]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.submissions, 1);
        assert!(matches!(report.last_outcome, Some(Err(SubmitError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_read_upload_guesses_mime() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"png-bytes").unwrap();

        let upload = read_upload(file.path()).await.unwrap();
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.size_bytes, 9);

        let missing = NamedTempFile::new().unwrap().path().to_path_buf();
        assert!(read_upload(&missing).await.is_err());
    }
}
