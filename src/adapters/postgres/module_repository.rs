//! PostgreSQL implementation of ModuleRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{AssistantId, DomainError, ModuleId};
use crate::domain::module::Module;
use crate::domain::subscription::ModuleTier;
use crate::ports::ModuleRepository;

pub struct PostgresModuleRepository {
    pool: PgPool,
}

impl PostgresModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ModuleRow {
    id: String,
    name: String,
    tier: String,
    assistant_id: Option<String>,
    enabled: bool,
}

impl TryFrom<ModuleRow> for Module {
    type Error = DomainError;

    fn try_from(row: ModuleRow) -> Result<Self, Self::Error> {
        let id = ModuleId::new(row.id)
            .map_err(|e| DomainError::database(format!("Invalid module id: {}", e)))?;
        let assistant_id = row
            .assistant_id
            .filter(|a| !a.trim().is_empty())
            .map(AssistantId::new)
            .transpose()
            .map_err(|e| DomainError::database(format!("Invalid assistant id: {}", e)))?;

        Ok(Module {
            id,
            name: row.name,
            tier: parse_tier(&row.tier)?,
            assistant_id,
            enabled: row.enabled,
        })
    }
}

fn parse_tier(s: &str) -> Result<ModuleTier, DomainError> {
    match s.to_lowercase().as_str() {
        "free" => Ok(ModuleTier::Free),
        "pro" => Ok(ModuleTier::Pro),
        "premium" => Ok(ModuleTier::Premium),
        _ => Err(DomainError::database(format!("Invalid tier value: {}", s))),
    }
}

fn tier_to_string(tier: ModuleTier) -> &'static str {
    match tier {
        ModuleTier::Free => "free",
        ModuleTier::Pro => "pro",
        ModuleTier::Premium => "premium",
    }
}

#[async_trait]
impl ModuleRepository for PostgresModuleRepository {
    async fn list(&self) -> Result<Vec<Module>, DomainError> {
        let rows: Vec<ModuleRow> = sqlx::query_as(
            "SELECT id, name, tier, assistant_id, enabled FROM modules ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list modules: {}", e)))?;

        rows.into_iter().map(Module::try_from).collect()
    }

    async fn find(&self, id: &ModuleId) -> Result<Option<Module>, DomainError> {
        let row: Option<ModuleRow> = sqlx::query_as(
            "SELECT id, name, tier, assistant_id, enabled FROM modules WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find module: {}", e)))?;

        row.map(Module::try_from).transpose()
    }

    async fn save(&self, module: &Module) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO modules (id, name, tier, assistant_id, enabled)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                tier = EXCLUDED.tier,
                assistant_id = EXCLUDED.assistant_id,
                enabled = EXCLUDED.enabled,
                updated_at = NOW()
            "#,
        )
        .bind(module.id.as_str())
        .bind(&module.name)
        .bind(tier_to_string(module.tier))
        .bind(module.assistant_id.as_ref().map(|a| a.as_str()))
        .bind(module.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save module: {}", e)))?;

        Ok(())
    }
}
