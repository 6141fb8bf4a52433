// Typed RPC layer: procedures are looked up by name, queries over GET and
// mutations over POST. `Protected` gates a body on a resolved session.

pub use app_router::app_router;
pub use handlers::{rpc_mutation, rpc_query};
pub use procedure::{
    parse_input, Procedure, ProcedureKind, Protected, ProtectedBody, ProtectedContext, RpcContext,
};
pub use router::ProcedureRouter;

pub mod app_router;
mod handlers;
mod procedure;
mod router;
