pub mod authors;
pub mod books;
pub mod extract;
pub mod state;

use bookshelf_kernel::ModuleRegistry;

pub use state::CatalogState;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: CatalogState) {
    registry.register(authors::create_module(state.clone()));
    registry.register(books::create_module(state));
}
