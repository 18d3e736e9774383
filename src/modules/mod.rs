pub mod albums;

use std::sync::Arc;

use folio_authz::AuthorizationGate;
use folio_kernel::ModuleRegistry;

use albums::service::AlbumService;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    albums: Arc<AlbumService>,
    gate: Arc<dyn AuthorizationGate>,
) {
    registry.register(albums::create_module(albums, gate));
}
