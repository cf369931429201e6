use super::*;

#[derive(Debug, FromRow)]
struct IdRow {
    id: i64,
}

#[derive(Debug, FromRow)]
struct ExistsRow {
    taken: bool,
}

const FIELD_DETAIL_FROM: &str = r#"
    FROM fields
    INNER JOIN field_types ON field_types.id = fields.field_type_id
    INNER JOIN forms ON forms.id = fields.form_id
"#;

const FORM_COLUMNS: &str = r#"
    forms.name AS form_name,
    forms.description AS form_description,
    forms.is_active AS form_is_active,
    forms.created_at AS form_created_at
"#;

fn choices_value(draft: &FieldDraft) -> AppResult<Option<Value>> {
    draft
        .choices()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|error| AppError::Internal(format!("failed to serialize field choices: {error}")))
}

fn map_field_write_error(error: sqlx::Error, draft: &FieldDraft, action: &str) -> AppError {
    match database_error_code(&error).as_deref() {
        Some(UNIQUE_VIOLATION) => {
            warn!(
                form_id = draft.form_id().as_i64(),
                field_name = draft.name().as_str(),
                "field name uniqueness enforced by database"
            );
            AppError::Conflict(format!(
                "field '{}' already exists in form '{}'",
                draft.name().as_str(),
                draft.form_id()
            ))
        }
        Some(FOREIGN_KEY_VIOLATION) => {
            if database_error_constraint(&error) == Some(FIELD_FORM_FOREIGN_KEY) {
                AppError::field("form_id", FORM_UNAVAILABLE_MESSAGE)
            } else {
                AppError::field("field_type_id", FIELD_TYPE_UNAVAILABLE_MESSAGE)
            }
        }
        _ => AppError::Internal(format!("failed to {action} field: {error}")),
    }
}

impl PostgresSchemaRepository {
    pub(super) async fn field_name_taken_impl(
        &self,
        form_id: FormId,
        name: &str,
        excluding: Option<FieldId>,
    ) -> AppResult<bool> {
        let row = sqlx::query_as::<_, ExistsRow>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM fields
                WHERE form_id = $1
                    AND name = $2
                    AND ($3::BIGINT IS NULL OR id <> $3)
            ) AS taken
            "#,
        )
        .bind(form_id.as_i64())
        .bind(name)
        .bind(excluding.map(|field_id| field_id.as_i64()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check field name uniqueness: {error}"))
        })?;

        Ok(row.taken)
    }

    pub(super) async fn create_field_impl(&self, draft: FieldDraft) -> AppResult<FieldDefinition> {
        let choices = choices_value(&draft)?;
        let row = sqlx::query_as::<_, IdRow>(
            r#"
            INSERT INTO fields (form_id, field_type_id, name, is_required, choices)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(draft.form_id().as_i64())
        .bind(draft.field_type().id().as_i64())
        .bind(draft.name().as_str())
        .bind(draft.is_required())
        .bind(choices)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_field_write_error(error, &draft, "create"))?;

        Ok(FieldDefinition::from_draft(FieldId::new(row.id), draft))
    }

    pub(super) async fn update_field_impl(
        &self,
        field_id: FieldId,
        draft: FieldDraft,
    ) -> AppResult<FieldDefinition> {
        let choices = choices_value(&draft)?;
        let row = sqlx::query_as::<_, IdRow>(
            r#"
            UPDATE fields
            SET form_id = $2, field_type_id = $3, name = $4, is_required = $5, choices = $6
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(field_id.as_i64())
        .bind(draft.form_id().as_i64())
        .bind(draft.field_type().id().as_i64())
        .bind(draft.name().as_str())
        .bind(draft.is_required())
        .bind(choices)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_field_write_error(error, &draft, "update"))?;

        let row =
            row.ok_or_else(|| AppError::NotFound(format!("field '{field_id}' does not exist")))?;
        Ok(FieldDefinition::from_draft(FieldId::new(row.id), draft))
    }

    pub(super) async fn delete_field_impl(&self, field_id: FieldId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM fields
            WHERE id = $1
            "#,
        )
        .bind(field_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete field '{field_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "field '{field_id}' does not exist"
            )));
        }

        Ok(())
    }

    pub(super) async fn find_field_impl(&self, field_id: FieldId) -> AppResult<Option<FieldDetail>> {
        let sql = format!(
            r#"
            SELECT {FIELD_COLUMNS}, {FORM_COLUMNS}
            {FIELD_DETAIL_FROM}
            WHERE fields.id = $1
            "#
        );
        let row = sqlx::query_as::<_, FieldDetailRow>(sql.as_str())
            .bind(field_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find field '{field_id}': {error}"))
            })?;

        row.map(FieldDetailRow::into_detail).transpose()
    }

    pub(super) async fn list_fields_impl(
        &self,
        filter: &FieldListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>> {
        let (limit, offset) = page_bounds(query);
        let form_id = filter.form_id.map(|form_id| form_id.as_i64());
        let predicate = r#"
            WHERE ($1::BIGINT IS NULL OR fields.form_id = $1)
                AND (NOT $2 OR forms.is_active)
        "#;

        let count_sql = format!("SELECT COUNT(*) AS count {FIELD_DETAIL_FROM} {predicate}");
        let count = sqlx::query_as::<_, CountRow>(count_sql.as_str())
            .bind(form_id)
            .bind(filter.active_forms_only)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count fields: {error}")))?;

        let sql = format!(
            r#"
            SELECT {FIELD_COLUMNS}, {FORM_COLUMNS}
            {FIELD_DETAIL_FROM}
            {predicate}
            ORDER BY fields.form_id, fields.id
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, FieldDetailRow>(sql.as_str())
            .bind(form_id)
            .bind(filter.active_forms_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list fields: {error}")))?;

        Ok(Page {
            count: page_count(count),
            items: rows
                .into_iter()
                .map(FieldDetailRow::into_detail)
                .collect::<AppResult<Vec<_>>>()?,
        })
    }
}
