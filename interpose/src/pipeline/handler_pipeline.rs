//! The ordered handler list for one method.

use interpose_core::{CallHandler, Continuation, Invocation, MethodResult, Next};
use std::sync::Arc;

/// An ordered, immutable list of call handlers.
///
/// Executing the pipeline hands the invocation to the first handler; each
/// handler may continue to the next one or answer on its own. After the
/// last handler the supplied continuation runs.
#[derive(Clone, Default)]
pub struct HandlerPipeline {
    handlers: Arc<[Arc<dyn CallHandler>]>,
}

impl HandlerPipeline {
    /// Wrap an already ordered handler list.
    pub fn new(handlers: Vec<Arc<dyn CallHandler>>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    /// A pipeline that passes straight through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The handlers, in execution order.
    pub fn handlers(&self) -> &[Arc<dyn CallHandler>] {
        &self.handlers
    }

    /// Handler orders, in execution order.
    pub fn orders(&self) -> Vec<i32> {
        self.handlers.iter().map(|h| h.order()).collect()
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the pipeline has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the pipeline, finishing with `target`.
    pub fn invoke(&self, invocation: &mut Invocation, target: Next<'_>) -> MethodResult {
        HandlerCursor {
            handlers: &self.handlers,
            target,
        }
        .proceed(invocation)
    }
}

impl std::fmt::Debug for HandlerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerPipeline")
            .field("orders", &self.orders())
            .finish()
    }
}

/// Position in a running pipeline.
struct HandlerCursor<'a> {
    handlers: &'a [Arc<dyn CallHandler>],
    target: Next<'a>,
}

impl Continuation for HandlerCursor<'_> {
    fn proceed(&self, invocation: &mut Invocation) -> MethodResult {
        match self.handlers.split_first() {
            Some((handler, rest)) => {
                let rest = HandlerCursor {
                    handlers: rest,
                    target: self.target,
                };
                handler.invoke(invocation, Next::new(&rest))
            }
            None => self.target.proceed(invocation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interpose_core::{Arguments, MethodDescriptor, ReturnValue};
    use interpose_std::{
        handlers::handler_fn,
        testing::{CountingHandler, OrderRecordingHandler},
    };
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    fn invocation() -> Invocation {
        Invocation::new(
            MethodDescriptor::builder("Wrappable", "method2").build(),
            Arguments::new().with(2_i32),
            Arc::new(()),
        )
    }

    #[test]
    fn empty_pipeline_calls_target() {
        let pipeline = HandlerPipeline::empty();
        let target = |_: &mut Invocation| -> MethodResult { Ok(ReturnValue::new(7_i32)) };
        let value = pipeline.invoke(&mut invocation(), Next::new(&target)).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn handlers_run_in_list_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handlers: Vec<Arc<dyn CallHandler>> = vec![
            Arc::new(OrderRecordingHandler::new(1, 0, log.clone())),
            Arc::new(OrderRecordingHandler::new(2, 0, log.clone())),
            Arc::new(OrderRecordingHandler::new(3, 0, log.clone())),
        ];
        let pipeline = HandlerPipeline::new(handlers);
        let target = |_: &mut Invocation| -> MethodResult { Ok(ReturnValue::unit()) };
        pipeline.invoke(&mut invocation(), Next::new(&target)).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn handler_can_answer_without_target() {
        let counter = CountingHandler::new();
        let handlers: Vec<Arc<dyn CallHandler>> = vec![
            Arc::new(handler_fn(0, |inv: &mut Invocation, _next: Next<'_>| {
                inv.return_value(42_i32)
            })),
            Arc::new(counter.clone()),
        ];
        let pipeline = HandlerPipeline::new(handlers);
        let reached = AtomicUsize::new(0);
        let target = |_: &mut Invocation| -> MethodResult {
            reached.fetch_add(1, Ordering::SeqCst);
            Ok(ReturnValue::unit())
        };

        let value = pipeline.invoke(&mut invocation(), Next::new(&target)).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
        assert_eq!(counter.count(), 0);
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_sees_argument_changes_of_earlier_handlers() {
        let handlers: Vec<Arc<dyn CallHandler>> =
            vec![Arc::new(handler_fn(0, |inv: &mut Invocation, next: Next<'_>| {
                inv.arguments_mut().set(0, 10_i32)?;
                next.proceed(inv)
            }))];
        let pipeline = HandlerPipeline::new(handlers);
        let target = |inv: &mut Invocation| -> MethodResult {
            let x: i32 = inv.arguments().cloned(0)?;
            Ok(ReturnValue::new(x * 2))
        };
        let value = pipeline.invoke(&mut invocation(), Next::new(&target)).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&20));
    }
}
