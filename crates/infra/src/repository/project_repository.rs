//! # ProjectRepository
//!
//! プロジェクトの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **所有者スコープ**: 一覧・件数はすべて所有ユーザー ID で絞り込む
//! - **格納順の保証**: 一覧は ID 昇順（挿入順）で返す
//! - **ファイル本体の分離**: アップロードファイルの生バイト列は挿入時のみ
//!   書き込み、読み出しクエリでは取得しない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use botforge_domain::{
   base_model::BaseModelId,
   project::{NewProject, Project, ProjectId},
   user::UserId,
   value_objects::{MimeType, ProjectName, Prompt, SystemName},
};

use crate::error::InfraError;

/// プロジェクトリポジトリトレイト
///
/// プロジェクトの永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait ProjectRepository: Send + Sync {
   /// 指定ユーザーが所有するプロジェクト数を取得する
   async fn count_by_owner(&self, user_id: UserId) -> Result<i64, InfraError>;

   /// 指定ユーザーのプロジェクトをページング付きで取得する
   ///
   /// ID 昇順（挿入順）で `offset` 件スキップし、最大 `limit` 件返す。
   async fn find_by_owner(
      &self,
      user_id: UserId,
      offset: i64,
      limit: i64,
   ) -> Result<Vec<Project>, InfraError>;

   /// ID でプロジェクトを検索する
   ///
   /// - `Ok(Some(project))`: プロジェクトが見つかった場合
   /// - `Ok(None)`: プロジェクトが見つからない場合
   /// - `Err(_)`: データベースエラー
   async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, InfraError>;

   /// プロジェクトを保存し、採番された ID を返す
   ///
   /// アップロードファイルの生バイト列もここで書き込む。
   async fn insert(&self, new_project: &NewProject) -> Result<ProjectId, InfraError>;

   /// プロジェクトに紐づく収集データ行を格納順で取得する
   ///
   /// 行は Bot ランタイムが書き込む。データがない場合は空の Vec を返す。
   async fn data_lines(&self, id: ProjectId) -> Result<Vec<String>, InfraError>;

   /// 全プロジェクト数を取得する（管理者統計用）
   async fn count_all(&self) -> Result<i64, InfraError>;
}

/// PostgreSQL 実装の ProjectRepository
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
   pool: PgPool,
}

impl PostgresProjectRepository {
   /// 新しいリポジトリインスタンスを作成する
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

/// projects テーブルの行（ファイル本体は含まない）
#[derive(sqlx::FromRow)]
struct ProjectRow {
   id:            i64,
   user_id:       i64,
   name:          String,
   system_name:   String,
   mimetype:      String,
   base_model_id: i64,
   prompt:        String,
   created_at:    DateTime<Utc>,
}

impl ProjectRow {
   /// 行からドメインエンティティを復元する
   ///
   /// 保存済みの値はバリデーション済みのはずなので、
   /// 失敗は予期しないエラーとして扱う。
   fn into_domain(self) -> Result<Project, InfraError> {
      Ok(Project::from_db(
         ProjectId::from_i64(self.id),
         UserId::from_i64(self.user_id),
         ProjectName::new(&self.name).map_err(|e| InfraError::unexpected(e.to_string()))?,
         SystemName::new(&self.system_name).map_err(|e| InfraError::unexpected(e.to_string()))?,
         MimeType::new(&self.mimetype).map_err(|e| InfraError::unexpected(e.to_string()))?,
         BaseModelId::from_i64(self.base_model_id),
         Prompt::new(&self.prompt).map_err(|e| InfraError::unexpected(e.to_string()))?,
         self.created_at,
      ))
   }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
   async fn count_by_owner(&self, user_id: UserId) -> Result<i64, InfraError> {
      let count: i64 =
         sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await?;

      Ok(count)
   }

   async fn find_by_owner(
      &self,
      user_id: UserId,
      offset: i64,
      limit: i64,
   ) -> Result<Vec<Project>, InfraError> {
      let rows: Vec<ProjectRow> = sqlx::query_as(
         r#"
            SELECT
                id,
                user_id,
                name,
                system_name,
                mimetype,
                base_model_id,
                prompt,
                created_at
            FROM projects
            WHERE user_id = $1
            ORDER BY id
            OFFSET $2
            LIMIT $3
            "#,
      )
      .bind(user_id.as_i64())
      .bind(offset)
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;

      rows.into_iter().map(ProjectRow::into_domain).collect()
   }

   async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, InfraError> {
      let row: Option<ProjectRow> = sqlx::query_as(
         r#"
            SELECT
                id,
                user_id,
                name,
                system_name,
                mimetype,
                base_model_id,
                prompt,
                created_at
            FROM projects
            WHERE id = $1
            "#,
      )
      .bind(id.as_i64())
      .fetch_optional(&self.pool)
      .await?;

      let Some(row) = row else {
         return Ok(None);
      };

      Ok(Some(row.into_domain()?))
   }

   async fn insert(&self, new_project: &NewProject) -> Result<ProjectId, InfraError> {
      let id: i64 = sqlx::query_scalar(
         r#"
            INSERT INTO projects
                (user_id, name, system_name, mimetype, base_model_id, prompt, file)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
      )
      .bind(new_project.user_id.as_i64())
      .bind(new_project.name.as_str())
      .bind(new_project.system_name.as_str())
      .bind(new_project.mimetype.as_str())
      .bind(new_project.base_model_id.as_i64())
      .bind(new_project.prompt.as_str())
      .bind(&new_project.file)
      .fetch_one(&self.pool)
      .await?;

      Ok(ProjectId::from_i64(id))
   }

   async fn data_lines(&self, id: ProjectId) -> Result<Vec<String>, InfraError> {
      let lines: Vec<String> = sqlx::query_scalar(
         "SELECT line FROM project_data_lines WHERE project_id = $1 ORDER BY position",
      )
      .bind(id.as_i64())
      .fetch_all(&self.pool)
      .await?;

      Ok(lines)
   }

   async fn count_all(&self) -> Result<i64, InfraError> {
      let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
         .fetch_one(&self.pool)
         .await?;

      Ok(count)
   }
}
