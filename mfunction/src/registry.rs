//! Function registry with duplicate-rejecting registration and isolated
//! execution.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use mclient::FunctionSpec;
use mcommon::Registry;
use mmessage::ArgumentMap;

use crate::{
    ClosureFunction, ExecutionContext, FunctionError, FunctionFuture, HostFunction,
};

#[derive(Default)]
pub struct FunctionRegistry {
    functions: Registry<String, Arc<dyn HostFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under its spec name. A name can be taken only
    /// once; losing registrations leave the original intact.
    pub fn register<F>(&mut self, function: F) -> Result<(), FunctionError>
    where
        F: HostFunction + 'static,
    {
        let name = function.spec().name;
        if self.functions.contains_key(&name) {
            return Err(FunctionError::duplicate_name(format!(
                "function '{name}' is already registered"
            ))
            .with_function_name(name));
        }

        self.functions.insert(name, Arc::new(function));
        Ok(())
    }

    pub fn register_fn<F, Fut>(
        &mut self,
        spec: FunctionSpec,
        handler: F,
    ) -> Result<(), FunctionError>
    where
        F: Fn(ArgumentMap, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, FunctionError>> + Send + 'static,
    {
        self.register(ClosureFunction::new(spec, handler))
    }

    pub fn register_sync_fn<F>(
        &mut self,
        spec: FunctionSpec,
        handler: F,
    ) -> Result<(), FunctionError>
    where
        F: Fn(ArgumentMap, ExecutionContext) -> Result<String, FunctionError>
            + Send
            + Sync
            + 'static,
    {
        self.register_fn(spec, move |arguments, context| {
            let output = handler(arguments, context);
            async move { output }
        })
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn HostFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn HostFunction>> {
        self.functions.remove(name)
    }

    /// Specs of every registered function, as advertised to the model.
    pub fn specs(&self) -> Vec<FunctionSpec> {
        self.functions
            .values()
            .map(|function| function.spec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Resolves and invokes `name`, tagging every failure with the
    /// function name. Executor panics are caught and converted, so a
    /// misbehaving function cannot tear down the orchestration loop.
    pub fn execute<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a ArgumentMap,
        context: &'a ExecutionContext,
    ) -> FunctionFuture<'a, Result<String, FunctionError>> {
        Box::pin(async move {
            let function = self.resolve(name).ok_or_else(|| {
                FunctionError::not_found(format!("function '{name}' is not registered"))
                    .with_function_name(name)
            })?;

            let invocation = AssertUnwindSafe(function.invoke(arguments, context)).catch_unwind();
            match invocation.await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(error)) => Err(error.with_function_name(name)),
                Err(panic) => Err(FunctionError::execution(format!(
                    "function panicked: {}",
                    panic_message(panic.as_ref())
                ))
                .with_function_name(name)),
            }
        })
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
