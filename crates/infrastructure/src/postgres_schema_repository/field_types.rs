use super::*;

impl PostgresSchemaRepository {
    pub(super) async fn create_field_type_impl(
        &self,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition> {
        let row = sqlx::query_as::<_, FieldTypeRow>(
            r#"
            INSERT INTO field_types (name, code, description, validation_metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, code, description, validation_metadata
            "#,
        )
        .bind(draft.name().as_str())
        .bind(draft.code().as_str())
        .bind(draft.description())
        .bind(draft.validation_metadata().cloned())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create field type: {error}")))?;

        row.into_definition()
    }

    pub(super) async fn update_field_type_impl(
        &self,
        field_type_id: FieldTypeId,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition> {
        let row = sqlx::query_as::<_, FieldTypeRow>(
            r#"
            UPDATE field_types
            SET name = $2, code = $3, description = $4, validation_metadata = $5
            WHERE id = $1
            RETURNING id, name, code, description, validation_metadata
            "#,
        )
        .bind(field_type_id.as_i64())
        .bind(draft.name().as_str())
        .bind(draft.code().as_str())
        .bind(draft.description())
        .bind(draft.validation_metadata().cloned())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update field type '{field_type_id}': {error}"
            ))
        })?;

        row.ok_or_else(|| {
            AppError::NotFound(format!("field type '{field_type_id}' does not exist"))
        })?
        .into_definition()
    }

    pub(super) async fn delete_field_type_impl(&self, field_type_id: FieldTypeId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM field_types
            WHERE id = $1
            "#,
        )
        .bind(field_type_id.as_i64())
        .execute(&self.pool)
        .await;

        match result {
            Ok(result) if result.rows_affected() == 0 => Err(AppError::NotFound(format!(
                "field type '{field_type_id}' does not exist"
            ))),
            Ok(_) => Ok(()),
            Err(error) => {
                if database_error_code(&error).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                    return Err(AppError::Conflict(format!(
                        "field type '{field_type_id}' is still referenced by fields"
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to delete field type '{field_type_id}': {error}"
                )))
            }
        }
    }

    pub(super) async fn find_field_type_impl(
        &self,
        field_type_id: FieldTypeId,
    ) -> AppResult<Option<FieldTypeDefinition>> {
        let row = sqlx::query_as::<_, FieldTypeRow>(
            r#"
            SELECT id, name, code, description, validation_metadata
            FROM field_types
            WHERE id = $1
            "#,
        )
        .bind(field_type_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find field type '{field_type_id}': {error}"
            ))
        })?;

        row.map(FieldTypeRow::into_definition).transpose()
    }

    pub(super) async fn list_field_types_impl(
        &self,
        query: ListQuery,
    ) -> AppResult<Page<FieldTypeDefinition>> {
        let (limit, offset) = page_bounds(query);

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS count
            FROM field_types
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count field types: {error}")))?;

        let rows = sqlx::query_as::<_, FieldTypeRow>(
            r#"
            SELECT id, name, code, description, validation_metadata
            FROM field_types
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list field types: {error}")))?;

        Ok(Page {
            count: page_count(count),
            items: rows
                .into_iter()
                .map(FieldTypeRow::into_definition)
                .collect::<AppResult<Vec<_>>>()?,
        })
    }
}
