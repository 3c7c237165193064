use crate::domain::ports::{ChangeNotice, Notifier};

/// Hand a committed change to the notification subsystem.
///
/// Failures are logged and swallowed; the mutation has already committed.
pub async fn notify_best_effort(notifier: &dyn Notifier, notice: ChangeNotice) {
    if let Err(err) = notifier.notify(&notice).await {
        tracing::warn!(
            project_id = %notice.project_id,
            activity_type = notice.activity_type.as_str(),
            error = %err,
            "change notification failed"
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::ports::{ChangeNotice, Notifier};

    /// Captures notices; optionally fails every call after capturing.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub notices: Mutex<Vec<ChangeNotice>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                notices: Mutex::default(),
                fail: true,
            }
        }

        pub fn count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notice: &ChangeNotice) -> anyhow::Result<()> {
            self.notices.lock().unwrap().push(notice.clone());
            if self.fail {
                anyhow::bail!("notification channel unavailable");
            }
            Ok(())
        }
    }
}
