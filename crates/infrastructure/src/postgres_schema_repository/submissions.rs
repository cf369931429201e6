use super::*;

impl PostgresSchemaRepository {
    pub(super) async fn create_submission_impl(
        &self,
        draft: SubmissionDraft,
    ) -> AppResult<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO submissions (form_id, form_name, submitted_data)
            VALUES ($1, $2, $3)
            RETURNING id, form_id, form_name, submitted_data, submitted_at
            "#,
        )
        .bind(draft.form_id().as_i64())
        .bind(draft.form_name().as_str())
        .bind(Value::Object(draft.submitted_data().clone()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to store submission for form '{}': {error}",
                draft.form_id()
            ))
        })?;

        row.into_submission()
    }

    pub(super) async fn find_submission_impl(
        &self,
        submission_id: SubmissionId,
    ) -> AppResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, form_id, form_name, submitted_data, submitted_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(submission_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find submission '{submission_id}': {error}"
            ))
        })?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    pub(super) async fn list_submissions_impl(
        &self,
        filter: &SubmissionListFilter,
        query: ListQuery,
    ) -> AppResult<Page<Submission>> {
        let (limit, offset) = page_bounds(query);
        let form_id = filter.form_id.map(|form_id| form_id.as_i64());

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS count
            FROM submissions
            WHERE ($1::BIGINT IS NULL OR form_id = $1)
            "#,
        )
        .bind(form_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count submissions: {error}")))?;

        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, form_id, form_name, submitted_data, submitted_at
            FROM submissions
            WHERE ($1::BIGINT IS NULL OR form_id = $1)
            ORDER BY submitted_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(form_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list submissions: {error}")))?;

        Ok(Page {
            count: page_count(count),
            items: rows
                .into_iter()
                .map(SubmissionRow::into_submission)
                .collect::<AppResult<Vec<_>>>()?,
        })
    }
}
