//! Access surface.
//!
//! | operation | arguments                         | output              |
//! |-----------|-----------------------------------|---------------------|
//! | `empty`   | `identification`                  | `{isEmpty}`         |
//! | `push`    | `identification`, `valueToPush`   | `{}`                |
//! | `pop`     | `identification`                  | `{poppedValue}`     |
//! | `peek`    | `identification`                  | `{peekedValue}`     |
//! | `search`  | `identification`, `valueToSearch` | `{containsValue}`   |

use crate::error::SurfaceError;
use keystack_core::{ExecutionMode, StackEngine, StackError};
use keystack_storage::StackStore;
use keystack_types::{Felt, Identification, Operation, OperationKind, Outcome};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use std::sync::Arc;

/// Object-safe view of a stack engine, whatever its backend.
pub trait StackService: Send + Sync {
    fn execute(
        &self,
        id: Identification,
        operation: Operation,
        mode: ExecutionMode,
    ) -> Result<Outcome, StackError>;

    fn backend(&self) -> &'static str;
}

impl<S: StackStore + Send + Sync> StackService for StackEngine<S> {
    fn execute(
        &self,
        id: Identification,
        operation: Operation,
        mode: ExecutionMode,
    ) -> Result<Outcome, StackError> {
        StackEngine::execute(self, id, operation, mode)
    }

    fn backend(&self) -> &'static str {
        self.store().backend()
    }
}

/// Named-argument entry point onto a stack service.
#[derive(Clone)]
pub struct AccessSurface {
    service: Arc<dyn StackService>,
}

impl AccessSurface {
    pub fn new(service: Arc<dyn StackService>) -> Self {
        Self { service }
    }

    /// Wrap an engine directly.
    pub fn from_engine<S>(engine: StackEngine<S>) -> Self
    where
        S: StackStore + Send + Sync + 'static,
    {
        Self::new(Arc::new(engine))
    }

    pub fn backend(&self) -> &'static str {
        self.service.backend()
    }

    /// Read-only execution; every write is discarded.
    pub fn call(&self, operation: &str, args: &Value) -> Result<Value, SurfaceError> {
        self.dispatch(operation, args, ExecutionMode::Call)
    }

    /// Committing execution.
    pub fn invoke(&self, operation: &str, args: &Value) -> Result<Value, SurfaceError> {
        self.dispatch(operation, args, ExecutionMode::Invoke)
    }

    pub fn dispatch(
        &self,
        operation: &str,
        args: &Value,
        mode: ExecutionMode,
    ) -> Result<Value, SurfaceError> {
        let (id, operation) = parse_operation(operation, args)?;
        let outcome = self.service.execute(id, operation, mode)?;
        Ok(outcome_to_json(&outcome))
    }
}

/// Resolve an operation name and its named arguments.
pub fn parse_operation(name: &str, args: &Value) -> Result<(Identification, Operation), SurfaceError> {
    let kind = OperationKind::from_str(name)?;
    if !args.is_object() {
        return Err(SurfaceError::InvalidArgument(
            "arguments must be a JSON object".to_string(),
        ));
    }

    let id: Identification = arg(args, "identification")?;
    let operation = match kind {
        OperationKind::Empty => Operation::Empty,
        OperationKind::Push => Operation::Push(arg::<Felt>(args, "valueToPush")?),
        OperationKind::Pop => Operation::Pop,
        OperationKind::Peek => Operation::Peek,
        OperationKind::Search => Operation::Search(arg::<Felt>(args, "valueToSearch")?),
    };
    Ok((id, operation))
}

fn arg<T: DeserializeOwned>(args: &Value, name: &str) -> Result<T, SurfaceError> {
    let value = args
        .get(name)
        .ok_or_else(|| SurfaceError::InvalidArgument(format!("missing argument '{}'", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| SurfaceError::InvalidArgument(format!("'{}': {}", name, e)))
}

/// Named output object for an outcome.
pub fn outcome_to_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::IsEmpty(is_empty) => json!({ "isEmpty": is_empty }),
        Outcome::Pushed => Value::Object(Map::new()),
        Outcome::Popped(v) => json!({ "poppedValue": felt_to_json(*v) }),
        Outcome::Peeked(v) => json!({ "peekedValue": felt_to_json(*v) }),
        Outcome::Contains(found) => json!({ "containsValue": found }),
    }
}

/// JSON number when it fits in 64 bits, decimal string otherwise.
pub fn felt_to_json(v: Felt) -> Value {
    let raw = v.value();
    if let Ok(small) = i64::try_from(raw) {
        Value::from(small)
    } else if let Ok(unsigned) = u64::try_from(raw) {
        Value::from(unsigned)
    } else {
        Value::String(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystack_storage::MemoryStore;

    fn surface() -> AccessSurface {
        AccessSurface::from_engine(StackEngine::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_on_fresh_identification() {
        let surface = surface();
        let out = surface.call("empty", &json!({ "identification": 2 })).unwrap();
        assert_eq!(out, json!({ "isEmpty": true }));
    }

    #[test]
    fn test_push_returns_empty_object() {
        let surface = surface();
        let out = surface
            .invoke("push", &json!({ "identification": 2, "valueToPush": 42 }))
            .unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn test_call_then_invoke_pop() {
        let surface = surface();
        let args = json!({ "identification": 3 });
        surface
            .invoke("push", &json!({ "identification": 3, "valueToPush": 42 }))
            .unwrap();

        assert_eq!(surface.call("pop", &args).unwrap(), json!({ "poppedValue": 42 }));
        assert_eq!(surface.invoke("pop", &args).unwrap(), json!({ "poppedValue": 42 }));
        assert_eq!(surface.call("empty", &args).unwrap(), json!({ "isEmpty": true }));
    }

    #[test]
    fn test_string_arguments() {
        let surface = surface();
        surface
            .invoke("push", &json!({ "identification": "0x10", "valueToPush": "-22" }))
            .unwrap();
        let out = surface.call("peek", &json!({ "identification": 16 })).unwrap();
        assert_eq!(out, json!({ "peekedValue": -22 }));
    }

    #[test]
    fn test_large_values_become_strings() {
        let big = Felt::new(i128::MAX);
        assert_eq!(felt_to_json(big), Value::String(i128::MAX.to_string()));
        assert_eq!(felt_to_json(Felt::from(u64::MAX)), Value::from(u64::MAX));
    }

    #[test]
    fn test_errors() {
        let surface = surface();
        let err = surface.call("pop", &json!({ "identification": 4 })).unwrap_err();
        assert!(err.to_string().contains("Stack empty"));

        let err = surface.call("drop", &json!({ "identification": 4 })).unwrap_err();
        assert!(matches!(err, SurfaceError::UnknownOperation(_)));

        let err = surface.invoke("push", &json!({ "identification": 4 })).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidArgument(ref m) if m.contains("valueToPush")));

        let err = surface.call("empty", &json!({})).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidArgument(ref m) if m.contains("identification")));

        let err = surface.call("empty", &json!([1])).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidArgument(_)));

        let err = surface.call("empty", &json!({ "identification": -1 })).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidArgument(_)));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(surface().backend(), "memory");
    }
}
