//! Built-in generators.
//!
//! Each generator is a pure function from the generation context to file
//! content, configured through the registry by name. The decorators share
//! one shape: a wrapper struct holding the next implementation in the chain
//! plus one forwarding method per IR method.

pub mod cmd_main;
pub mod common;
pub mod logging;
pub mod middleware;
pub mod recovering;
pub mod stub;
pub mod tracing;
pub mod transport_jsonrpc;
pub mod typeconv;

use crate::pipeline::Registry;

/// Register every built-in generator under its configured name.
pub fn register_builtin(registry: &mut Registry) {
    registry.register("middleware", middleware::MiddlewareGenerator::create);
    registry.register("logging", logging::LoggingGenerator::create);
    registry.register("recovering", recovering::RecoveringGenerator::create);
    registry.register("tracing", tracing::TracingGenerator::create);
    registry.register(
        "transport-jsonrpc",
        transport_jsonrpc::JsonRpcServerGenerator::create,
    );
    registry.register("stub-service", stub::StubServiceGenerator::create);
    registry.register("type-converters", typeconv::TypeConvGenerator::create);
    registry.register("cmd-main", cmd_main::CmdMainGenerator::create);
}
