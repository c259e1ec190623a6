pub mod concurrent_builds;
pub mod helpers;
pub mod rpc_envelope;
pub mod schema_evolution;
pub mod shapes;
