//! Startup reconciliation of configured repositories.

use repo_sync_api::{apply_repository, AppState, RepositoryDefinition};
use tracing::{info, warn};

/// Outcome of seeding configured repositories.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Store and reconcile every configured repository.
///
/// Goes through the same create-or-update path as the repository API. A
/// repository that fails is logged and skipped; the rest are still seeded.
pub async fn seed_repositories(
    state: &AppState,
    definitions: &[RepositoryDefinition],
) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for definition in definitions {
        match apply_repository(state, &definition.name, definition.spec.clone()).await {
            Ok(repository) => {
                summary.applied += 1;
                info!(
                    repository = %repository.name,
                    webhook_id = repository.status.webhook.as_ref().map(|w| w.id),
                    "Seeded repository"
                );
            }
            Err(e) => {
                summary.failed += 1;
                warn!(repository = %definition.name, error = %e, "Failed to seed repository");
            }
        }
    }

    summary
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
