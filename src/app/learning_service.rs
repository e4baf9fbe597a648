//! Learning domain service: the entry point screens use for educational
//! content, module progress, quizzes and favorites.

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use super::cancel::CancellationToken;
use super::inflight::InFlightRegistry;
use super::outcome::{run_mutation, run_read};
use crate::domain::{
    AppError, CompletionRequest, ContentFilter, EducationalContent, FavoritePayload,
    LearningClient, LearningProgress, ProgressPayload, ProgressUpdate, QuizAnswer, QuizPayload,
    QuizSubmission, ServiceError, ServiceResponse,
};

const FETCH_CONTENT_FAILED: ServiceError = ServiceError::new(
    "get_educational_content",
    "Failed to fetch educational content",
);
const FETCH_CONTENT_ITEM_FAILED: ServiceError =
    ServiceError::new("get_content_by_id", "Failed to fetch content");
const SEARCH_FAILED: ServiceError = ServiceError::new("search_content", "Failed to search content");
const RECOMMENDATIONS_FAILED: ServiceError = ServiceError::new(
    "get_recommended_content",
    "Failed to fetch recommendations",
);
const FAVORITES_FAILED: ServiceError =
    ServiceError::new("get_favorites", "Failed to fetch favorites");
const PROGRESS_FAILED: ServiceError = ServiceError::new(
    "get_learning_progress",
    "Failed to fetch learning progress",
);
const MODULE_PROGRESS_FAILED: ServiceError = ServiceError::new(
    "get_module_progress",
    "Failed to fetch module progress",
);

const START_FAILED: &str = "Failed to start learning module";
const UPDATE_FAILED: &str = "Failed to update learning progress";
const COMPLETE_FAILED: &str = "Failed to complete learning module";
const QUIZ_FAILED: &str = "Failed to submit quiz";
const FAVORITE_FAILED: &str = "Failed to toggle favorite";

/// Default page size for recommendations
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 10;

pub struct LearningService {
    client: Arc<dyn LearningClient>,
    in_flight: InFlightRegistry,
}

impl LearningService {
    #[must_use]
    pub fn new(client: Arc<dyn LearningClient>) -> Self {
        Self {
            client,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// List educational content matching `filter`
    #[instrument(skip(self, cancel))]
    pub async fn get_educational_content(
        &self,
        filter: &ContentFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<EducationalContent>, AppError> {
        info!("Fetching educational content");
        run_read(cancel, FETCH_CONTENT_FAILED, async {
            filter.validate()?;
            self.client.list_content(filter).await
        })
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_content_by_id(
        &self,
        content_id: &str,
        cancel: &CancellationToken,
    ) -> Result<EducationalContent, AppError> {
        info!("Fetching content item");
        run_read(cancel, FETCH_CONTENT_ITEM_FAILED, self.client.get_content(content_id)).await
    }

    /// Search content by free text. A blank query matches nothing and is
    /// not sent to the backend.
    #[instrument(skip(self, cancel))]
    pub async fn search_content(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<EducationalContent>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        info!("Searching content");
        run_read(cancel, SEARCH_FAILED, self.client.search_content(query)).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_recommended_content(
        &self,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<Vec<EducationalContent>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
            .clamp(1, 100);
        info!(limit = limit, "Fetching recommended content");
        run_read(cancel, RECOMMENDATIONS_FAILED, self.client.get_recommendations(limit)).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_favorites(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<EducationalContent>, AppError> {
        info!("Fetching favorite content");
        run_read(cancel, FAVORITES_FAILED, self.client.list_favorites()).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_learning_progress(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<LearningProgress>, AppError> {
        info!("Fetching learning progress");
        run_read(cancel, PROGRESS_FAILED, self.client.list_progress()).await
    }

    /// Progress for one module. A module never started yields a zeroed,
    /// unsaved record instead of an error.
    #[instrument(skip(self, cancel))]
    pub async fn get_module_progress(
        &self,
        module_id: &str,
        cancel: &CancellationToken,
    ) -> Result<LearningProgress, AppError> {
        info!("Fetching module progress");
        let found = run_read(
            cancel,
            MODULE_PROGRESS_FAILED,
            self.client.get_module_progress(module_id),
        )
        .await?;
        Ok(found.unwrap_or_else(|| LearningProgress::not_started(module_id)))
    }

    /// Start a module. If progress already exists it is returned as is, so
    /// repeated starts never create a second record.
    #[instrument(skip(self, cancel))]
    pub async fn start_learning_module(
        &self,
        module_id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResponse<ProgressPayload> {
        info!("Starting learning module");
        run_mutation(
            &self.in_flight,
            "start_learning_module",
            module_id,
            START_FAILED,
            cancel,
            async {
                if let Some(existing) = self.client.get_module_progress(module_id).await? {
                    info!(progress_id = %existing.id, "Module already started");
                    return Ok(ProgressPayload {
                        progress: Some(existing),
                    });
                }
                cancel.check()?;
                let progress = self.client.start_module(module_id).await?;
                Ok::<_, AppError>(ProgressPayload {
                    progress: Some(progress),
                })
            },
        )
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn update_learning_progress(
        &self,
        module_id: &str,
        progress: f64,
        time_spent: u64,
        cancel: &CancellationToken,
    ) -> ServiceResponse<ProgressPayload> {
        info!("Updating learning progress");
        let update = ProgressUpdate {
            progress,
            time_spent,
        };
        run_mutation(
            &self.in_flight,
            "update_learning_progress",
            module_id,
            UPDATE_FAILED,
            cancel,
            async {
                update.validate()?;
                let progress = self.client.update_progress(module_id, &update).await?;
                Ok::<_, AppError>(ProgressPayload {
                    progress: Some(progress),
                })
            },
        )
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn complete_learning_module(
        &self,
        module_id: &str,
        score: f64,
        cancel: &CancellationToken,
    ) -> ServiceResponse<ProgressPayload> {
        info!("Completing learning module");
        run_mutation(
            &self.in_flight,
            "complete_learning_module",
            module_id,
            COMPLETE_FAILED,
            cancel,
            async {
                CompletionRequest { score }.validate()?;
                let progress = self.client.complete_module(module_id, score).await?;
                Ok::<_, AppError>(ProgressPayload {
                    progress: Some(progress),
                })
            },
        )
        .await
    }

    #[instrument(skip(self, answers, cancel), fields(answers = answers.len()))]
    pub async fn submit_quiz(
        &self,
        quiz_id: &str,
        answers: Vec<QuizAnswer>,
        cancel: &CancellationToken,
    ) -> ServiceResponse<QuizPayload> {
        info!("Submitting quiz");
        let submission = QuizSubmission { answers };
        run_mutation(
            &self.in_flight,
            "submit_quiz",
            quiz_id,
            QUIZ_FAILED,
            cancel,
            async {
                submission.validate()?;
                let result = self.client.submit_quiz(quiz_id, &submission).await?;
                Ok::<_, AppError>(QuizPayload {
                    result: Some(result),
                })
            },
        )
        .await
    }

    /// Flip the favorite flag. `is_favorite` is `false` when the call fails.
    #[instrument(skip(self, cancel))]
    pub async fn toggle_favorite(
        &self,
        content_id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResponse<FavoritePayload> {
        info!("Toggling favorite");
        run_mutation(
            &self.in_flight,
            "toggle_favorite",
            content_id,
            FAVORITE_FAILED,
            cancel,
            async {
                let status = self.client.toggle_favorite(content_id).await?;
                Ok::<_, AppError>(FavoritePayload {
                    is_favorite: status.is_favorite,
                })
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLearningClient;

    fn service(client: MockLearningClient) -> (LearningService, Arc<MockLearningClient>) {
        let client = Arc::new(client);
        (LearningService::new(Arc::clone(&client) as _), client)
    }

    #[tokio::test]
    async fn test_blank_search_skips_backend() {
        let (svc, client) = service(MockLearningClient::failing("boom"));
        let results = svc.search_content("   ", &CancellationToken::new()).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(client.call_count("search_content"), 0);
    }

    #[tokio::test]
    async fn test_module_progress_defaults_when_absent() {
        let (svc, _) = service(MockLearningClient::new());
        let progress = svc
            .get_module_progress("mod-7", &CancellationToken::new())
            .await
            .unwrap();
        assert!(!progress.is_started());
        assert_eq!(progress.module_id, "mod-7");
        assert_eq!(progress.progress, 0.0);
    }

    #[tokio::test]
    async fn test_start_returns_existing_progress() {
        let client = MockLearningClient::new();
        client.insert_progress(LearningProgress::new("p1", "mod-1", 40.0));
        let (svc, client) = service(client);

        let resp = svc
            .start_learning_module("mod-1", &CancellationToken::new())
            .await;

        assert!(resp.success);
        assert_eq!(resp.data.progress.unwrap().id, "p1");
        assert_eq!(client.call_count("start_module"), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_progress() {
        let (svc, client) = service(MockLearningClient::new());
        let resp = svc
            .update_learning_progress("mod-1", 120.0, 30, &CancellationToken::new())
            .await;
        assert!(!resp.success);
        assert!(resp.data.progress.is_none());
        assert!(resp.error.unwrap().contains("between 0 and 100"));
        assert_eq!(client.call_count("update_progress"), 0);
    }

    #[tokio::test]
    async fn test_non_finite_progress_and_score_not_sent() {
        let (svc, client) = service(MockLearningClient::new());
        let cancel = CancellationToken::new();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let resp = svc.update_learning_progress("mod-1", value, 10, &cancel).await;
            assert!(!resp.success);
            assert!(resp.error.unwrap().contains("finite"));

            let resp = svc.complete_learning_module("mod-1", value, &cancel).await;
            assert!(!resp.success);
            assert!(resp.data.progress.is_none());
        }
        assert_eq!(client.call_count("update_progress"), 0);
        assert_eq!(client.call_count("complete_module"), 0);
    }

    #[tokio::test]
    async fn test_recommendation_limit_clamped() {
        let (svc, client) = service(MockLearningClient::new());
        svc.get_recommended_content(Some(500), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(client.last_recommendation_limit(), Some(100));
    }
}
