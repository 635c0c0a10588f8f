//! ProgressNotifier port - Delivery of recomputed progress to open views.

use crate::domain::foundation::Percentage;
use crate::domain::questionnaire::ProgressKey;

/// Port for announcing a document instance's new completion percentage.
///
/// Delivery is best-effort: publishing with nobody listening is a no-op,
/// and only observers of the exact key are notified.
pub trait ProgressNotifier: Send + Sync {
    fn publish(&self, key: &ProgressKey, progress: Percentage);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ProgressNotifier) {}
}
