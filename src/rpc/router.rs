use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::procedure::{Procedure, ProcedureKind, RpcContext};
use crate::shared::AppError;

struct RegisteredProcedure {
    kind: ProcedureKind,
    procedure: Arc<dyn Procedure>,
}

/// Name-keyed table of procedures
#[derive(Default)]
pub struct ProcedureRouter {
    procedures: HashMap<String, RegisteredProcedure>,
}

impl ProcedureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(self, name: &str, procedure: impl Procedure + 'static) -> Self {
        self.register(name, ProcedureKind::Query, Arc::new(procedure))
    }

    pub fn mutation(self, name: &str, procedure: impl Procedure + 'static) -> Self {
        self.register(name, ProcedureKind::Mutation, Arc::new(procedure))
    }

    fn register(mut self, name: &str, kind: ProcedureKind, procedure: Arc<dyn Procedure>) -> Self {
        debug!(procedure = name, kind = %kind, "Registering procedure");
        self.procedures
            .insert(name.to_string(), RegisteredProcedure { kind, procedure });
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<ProcedureKind> {
        self.procedures.get(name).map(|p| p.kind)
    }

    /// Dispatches a call. Unknown names are `NotFound`; calling a query as a
    /// mutation (or the reverse) is `MethodNotSupported`.
    #[instrument(skip(self, ctx, input))]
    pub async fn call(
        &self,
        name: &str,
        kind: ProcedureKind,
        ctx: RpcContext,
        input: Value,
    ) -> Result<Value, AppError> {
        let registered = self.procedures.get(name).ok_or_else(|| {
            warn!(procedure = name, "Unknown procedure");
            AppError::NotFound(format!("No procedure named '{}'", name))
        })?;

        if registered.kind != kind {
            return Err(AppError::MethodNotSupported(format!(
                "'{}' is a {}, not a {}",
                name, registered.kind, kind
            )));
        }

        registered.procedure.call(ctx, input).await
    }
}
