//! Host function contract for registry-managed capabilities.
//!
//! ```rust
//! use mclient::FunctionSpec;
//! use mfunction::{ClosureFunction, HostFunction};
//!
//! let function = ClosureFunction::new(
//!     FunctionSpec::new("echo", "Echoes its arguments"),
//!     |arguments, _context| async move {
//!         Ok(serde_json::Value::Object(arguments).to_string())
//!     },
//! );
//!
//! assert_eq!(function.spec().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use mclient::FunctionSpec;
use mcommon::BoxFuture;
use mmessage::ArgumentMap;

use crate::{ExecutionContext, FunctionError};

pub type FunctionFuture<'a, T> = BoxFuture<'a, T>;

pub trait HostFunction: Send + Sync {
    fn spec(&self) -> FunctionSpec;

    fn invoke<'a>(
        &'a self,
        arguments: &'a ArgumentMap,
        context: &'a ExecutionContext,
    ) -> FunctionFuture<'a, Result<String, FunctionError>>;
}

type FunctionHandler = dyn Fn(ArgumentMap, ExecutionContext) -> FunctionFuture<'static, Result<String, FunctionError>>
    + Send
    + Sync;

pub struct ClosureFunction {
    spec: FunctionSpec,
    handler: Arc<FunctionHandler>,
}

impl ClosureFunction {
    pub fn new<F, Fut>(spec: FunctionSpec, handler: F) -> Self
    where
        F: Fn(ArgumentMap, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, FunctionError>> + Send + 'static,
    {
        let handler: Arc<FunctionHandler> =
            Arc::new(move |arguments, context| Box::pin(handler(arguments, context)));

        Self { spec, handler }
    }
}

impl HostFunction for ClosureFunction {
    fn spec(&self) -> FunctionSpec {
        self.spec.clone()
    }

    fn invoke<'a>(
        &'a self,
        arguments: &'a ArgumentMap,
        context: &'a ExecutionContext,
    ) -> FunctionFuture<'a, Result<String, FunctionError>> {
        let arguments = arguments.clone();
        let context = context.clone();
        (self.handler)(arguments, context)
    }
}
