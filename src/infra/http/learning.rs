//! Learning endpoints over HTTP.

use async_trait::async_trait;
use tracing::instrument;

use super::transport::{HttpTransport, path, validated, validated_all};
use crate::domain::{
    AppError, CompletionRequest, ContentFilter, EducationalContent, FavoriteStatus,
    LearningClient, LearningProgress, ProgressUpdate, QuizResult, QuizSubmission,
};

#[derive(Debug, Clone)]
pub struct HttpLearningClient {
    transport: HttpTransport,
}

impl HttpLearningClient {
    #[must_use]
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl LearningClient for HttpLearningClient {
    #[instrument(skip(self))]
    async fn list_content(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<EducationalContent>, AppError> {
        let content = self
            .transport
            .get_with_query("/learning/content", filter)
            .await?;
        validated_all(content)
    }

    #[instrument(skip(self))]
    async fn get_content(&self, content_id: &str) -> Result<EducationalContent, AppError> {
        let content = self
            .transport
            .get(&path(&["learning", "content", content_id])?)
            .await?;
        validated(content)
    }

    #[instrument(skip(self))]
    async fn search_content(&self, query: &str) -> Result<Vec<EducationalContent>, AppError> {
        let content = self
            .transport
            .get_with_query("/learning/content/search", &[("q", query)])
            .await?;
        validated_all(content)
    }

    #[instrument(skip(self))]
    async fn get_recommendations(&self, limit: u32) -> Result<Vec<EducationalContent>, AppError> {
        let content = self
            .transport
            .get_with_query("/learning/recommendations", &[("limit", limit)])
            .await?;
        validated_all(content)
    }

    #[instrument(skip(self))]
    async fn list_favorites(&self) -> Result<Vec<EducationalContent>, AppError> {
        let content = self.transport.get("/learning/favorites").await?;
        validated_all(content)
    }

    #[instrument(skip(self))]
    async fn list_progress(&self) -> Result<Vec<LearningProgress>, AppError> {
        let progress = self.transport.get("/learning/progress").await?;
        validated_all(progress)
    }

    #[instrument(skip(self))]
    async fn get_module_progress(
        &self,
        module_id: &str,
    ) -> Result<Option<LearningProgress>, AppError> {
        self.transport
            .get_optional(&path(&["learning", "progress", module_id])?)
            .await?
            .map(validated)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn start_module(&self, module_id: &str) -> Result<LearningProgress, AppError> {
        let progress = self
            .transport
            .post_empty(&path(&["learning", "modules", module_id, "start"])?)
            .await?;
        validated(progress)
    }

    #[instrument(skip(self))]
    async fn update_progress(
        &self,
        module_id: &str,
        update: &ProgressUpdate,
    ) -> Result<LearningProgress, AppError> {
        let progress = self
            .transport
            .put(&path(&["learning", "modules", module_id, "progress"])?, update)
            .await?;
        validated(progress)
    }

    #[instrument(skip(self))]
    async fn complete_module(
        &self,
        module_id: &str,
        score: f64,
    ) -> Result<LearningProgress, AppError> {
        let progress = self
            .transport
            .post(
                &path(&["learning", "modules", module_id, "complete"])?,
                &CompletionRequest { score },
            )
            .await?;
        validated(progress)
    }

    #[instrument(skip(self, submission), fields(answers = submission.answers.len()))]
    async fn submit_quiz(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, AppError> {
        let result = self
            .transport
            .post(&path(&["learning", "quizzes", quiz_id, "submit"])?, submission)
            .await?;
        validated(result)
    }

    #[instrument(skip(self))]
    async fn toggle_favorite(&self, content_id: &str) -> Result<FavoriteStatus, AppError> {
        self.transport
            .post_empty(&path(&["learning", "content", content_id, "favorite"])?)
            .await
    }
}
