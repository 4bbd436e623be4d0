use async_trait::async_trait;
use axum::Router;

/// Borrowed view of process-wide state handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Schema migration contributed by a module.
///
/// `up` is executed as a single SQL script. Migrations are applied once per
/// `(module, id)` pair and recorded by the database crate.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained slice of the HTTP surface: routes, docs and schema.
///
/// Lifecycle order is `init` for every module, then migrations, then `start`.
/// `stop` runs in reverse registration order once the server has drained.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key, also used to tag migrations.
    fn name(&self) -> &'static str;

    /// Path the module's router is nested under, e.g. `/books`.
    fn mount_path(&self) -> String {
        format!("/{}", self.name())
    }

    /// Runs before migrations. Must not touch the database.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to [`Module::mount_path`].
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount path and
    /// optional `components.schemas`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
