//! Bookshelf application library
//!
//! Authors and books resources, their in-memory catalog and the module
//! wiring that mounts them on the bookshelf HTTP server.

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod catalog;
pub mod modules;

pub use modules::{register_all, CatalogState};

/// Registry with every application module, sharing one catalog and cache.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let state = CatalogState::from_settings(settings)?;
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, state);
    Ok(registry)
}

/// Fully layered router for `settings`, without binding a socket.
pub fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(settings)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}

/// Run the module lifecycle around the HTTP server until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_all(&ctx)
        .await
        .with_context(|| "module initialization failed")?;
    registry
        .start_all(&ctx)
        .await
        .with_context(|| "module start failed")?;

    tracing::info!(modules = registry.len(), "bookshelf modules started");

    let served = bookshelf_http::start_server(&registry, &settings).await;
    registry.stop_all().await?;
    served
}
