use std::collections::BTreeMap;

use sqlx::{PgConnection, Postgres, Transaction};

use super::*;

const SELECT_FORM_BY_ID: &str = r#"
    SELECT id, name, description, is_active, created_at
    FROM forms
    WHERE id = $1
"#;

impl PostgresSchemaRepository {
    pub(super) async fn create_form_impl(&self, draft: FormDraft) -> AppResult<FormDefinition> {
        let row = sqlx::query_as::<_, FormRow>(
            r#"
            INSERT INTO forms (name, description, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(draft.name().as_str())
        .bind(draft.description())
        .bind(draft.is_active())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create form: {error}")))?;

        row.into_definition()
    }

    pub(super) async fn update_form_impl(
        &self,
        form_id: FormId,
        draft: FormDraft,
    ) -> AppResult<FormDefinition> {
        let row = sqlx::query_as::<_, FormRow>(
            r#"
            UPDATE forms
            SET name = $2, description = $3, is_active = $4
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(form_id.as_i64())
        .bind(draft.name().as_str())
        .bind(draft.description())
        .bind(draft.is_active())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update form '{form_id}': {error}"))
        })?;

        row.ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))?
            .into_definition()
    }

    pub(super) async fn delete_form_impl(&self, form_id: FormId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM forms
            WHERE id = $1
            "#,
        )
        .bind(form_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete form '{form_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("form '{form_id}' does not exist")));
        }

        Ok(())
    }

    pub(super) async fn find_form_impl(&self, form_id: FormId) -> AppResult<Option<FormDefinition>> {
        let row = sqlx::query_as::<_, FormRow>(SELECT_FORM_BY_ID)
            .bind(form_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find form '{form_id}': {error}"))
            })?;

        row.map(FormRow::into_definition).transpose()
    }

    /// Reads the form and its fields from one snapshot so a concurrent
    /// delete cannot yield a form without its fields.
    pub(super) async fn find_form_schema_impl(
        &self,
        form_id: FormId,
    ) -> AppResult<Option<FormSchema>> {
        let mut transaction = self.begin_snapshot().await?;

        let row = sqlx::query_as::<_, FormRow>(SELECT_FORM_BY_ID)
            .bind(form_id.as_i64())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find form '{form_id}': {error}"))
            })?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut fields = load_fields_for_forms(&mut transaction, &[form_id.as_i64()]).await?;
        commit_snapshot(transaction).await?;

        let form_fields = fields.remove(&form_id.as_i64()).unwrap_or_default();
        FormSchema::new(row.into_definition()?, form_fields).map(Some)
    }

    pub(super) async fn list_form_schemas_impl(
        &self,
        filter: &FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>> {
        let pattern = filter.search.as_deref().map(contains_pattern);
        let (limit, offset) = page_bounds(query);
        let mut transaction = self.begin_snapshot().await?;

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS count
            FROM forms
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
                AND ($2::TEXT IS NULL OR name ILIKE $2 OR description ILIKE $2)
            "#,
        )
        .bind(filter.is_active)
        .bind(pattern.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count forms: {error}")))?;

        let rows = sqlx::query_as::<_, FormRow>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM forms
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
                AND ($2::TEXT IS NULL OR name ILIKE $2 OR description ILIKE $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.is_active)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list forms: {error}")))?;

        let form_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut fields = load_fields_for_forms(&mut transaction, &form_ids).await?;
        commit_snapshot(transaction).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let form_fields = fields.remove(&row.id).unwrap_or_default();
                FormSchema::new(row.into_definition()?, form_fields)
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            count: page_count(count),
            items,
        })
    }

    async fn begin_snapshot(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start form read transaction: {error}"))
        })?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to set form read isolation: {error}"))
            })?;

        Ok(transaction)
    }
}

async fn commit_snapshot(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction.commit().await.map_err(|error| {
        AppError::Internal(format!("failed to finish form read transaction: {error}"))
    })
}

/// Loads fields of the given forms in declaration order, grouped by form.
async fn load_fields_for_forms(
    connection: &mut PgConnection,
    form_ids: &[i64],
) -> AppResult<BTreeMap<i64, Vec<FieldDefinition>>> {
    if form_ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let sql = format!(
        r#"
        SELECT {FIELD_COLUMNS}
        FROM fields
        INNER JOIN field_types ON field_types.id = fields.field_type_id
        WHERE fields.form_id = ANY($1)
        ORDER BY fields.form_id, fields.id
        "#
    );
    let rows = sqlx::query_as::<_, FieldRow>(sql.as_str())
        .bind(form_ids)
        .fetch_all(&mut *connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load form fields: {error}")))?;

    let mut grouped: BTreeMap<i64, Vec<FieldDefinition>> = BTreeMap::new();
    for row in rows {
        let form_id = row.form_id;
        grouped
            .entry(form_id)
            .or_default()
            .push(row.into_definition()?);
    }

    Ok(grouped)
}
