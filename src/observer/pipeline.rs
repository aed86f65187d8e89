// Write pipeline: observers executed in ring order with per-observer timeouts

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::timeout;

use crate::config::BootstrapConfig;
use crate::observer::context::ObserverContext;
use crate::observer::error::{ObserverError, ObserverResult, ObserverWarning};
use crate::observer::implementations;
use crate::observer::traits::{Observer, ObserverRing};

/// Observer registry executed in ring order.
/// Rings 0-6 run inline; rings 7-9 run detached after a successful write.
#[derive(Clone, Default)]
pub struct ObserverPipeline {
    observers: BTreeMap<ObserverRing, Vec<Arc<dyn Observer>>>,
}

impl ObserverPipeline {
    /// Create an empty pipeline; observers are added with `register_observer`
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with every built-in observer registered
    pub fn standard(bootstrap: &BootstrapConfig) -> Self {
        let mut pipeline = Self::new();
        implementations::register_all(&mut pipeline, bootstrap);
        pipeline
    }

    pub fn register_observer(&mut self, observer: impl Observer + 'static) {
        let ring = observer.ring();
        let name = observer.name();
        self.observers.entry(ring).or_default().push(Arc::new(observer));
        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    /// Run a write through the pipeline
    pub async fn execute(&self, mut ctx: ObserverContext) -> ObserverResult {
        let start_time = Instant::now();
        let relevant_rings = ObserverRing::for_operation(ctx.operation);

        if relevant_rings.is_empty() {
            ctx.add_error(ObserverError::PipelineError(format!(
                "operation {:?} does not run through the write pipeline",
                ctx.operation
            )));
        }

        tracing::debug!(
            "Observer pipeline starting: operation={:?}, collection={}, records={}",
            ctx.operation,
            ctx.collection.slug,
            ctx.records.len()
        );

        let mut rings_executed = Vec::new();
        for &ring in relevant_rings.iter().filter(|r| r.is_synchronous()) {
            if ctx.has_errors() {
                break;
            }
            ctx.current_ring = Some(ring);
            rings_executed.push(ring);

            let should_continue = self.execute_ring(ring, &mut ctx).await;
            if !should_continue {
                tracing::warn!(
                    "Observer pipeline stopped at ring {:?} for {}: {:?}",
                    ring,
                    ctx.collection.slug,
                    ctx.errors
                );
                break;
            }
        }

        if ctx.result.is_some() && !ctx.has_errors() {
            self.spawn_async_rings(relevant_rings, &ctx);
        }

        ObserverResult {
            documents: ctx.result.take().unwrap_or_default(),
            errors: ctx.errors,
            warnings: ctx.warnings,
            execution_time: start_time.elapsed(),
            rings_executed,
        }
    }

    /// Execute observers in a specific ring; `false` stops the pipeline
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) -> bool {
        let Some(observers) = self.observers.get(&ring) else {
            return true;
        };

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) || !observer.applies_to_collection(ctx.collection) {
                continue;
            }
            run_observer(observer.as_ref(), ctx).await;
        }

        // Stop execution on errors before anything is written, and after a failed write
        !(ctx.has_errors() && (ring.is_pre_database() || ring == ObserverRing::Database))
    }

    /// Execute asynchronous rings on the runtime without blocking the response
    fn spawn_async_rings(&self, relevant_rings: &[ObserverRing], ctx: &ObserverContext) {
        let observers: Vec<Arc<dyn Observer>> = relevant_rings
            .iter()
            .filter(|r| r.is_asynchronous())
            .filter_map(|r| self.observers.get(r))
            .flatten()
            .filter(|o| o.applies_to_operation(ctx.operation) && o.applies_to_collection(ctx.collection))
            .cloned()
            .collect();

        if observers.is_empty() {
            return;
        }

        let mut ctx = ctx.clone();
        tokio::spawn(async move {
            for observer in observers {
                ctx.current_ring = Some(observer.ring());
                run_observer(observer.as_ref(), &mut ctx).await;
            }
        });
    }
}

async fn run_observer(observer: &dyn Observer, ctx: &mut ObserverContext) {
    let observer_start = Instant::now();
    let result = timeout(observer.timeout(), observer.execute(ctx)).await;
    let execution_time = observer_start.elapsed();

    match result {
        Ok(Ok(())) => {
            tracing::trace!("Observer: {} completed in {:?}", observer.name(), execution_time);
        }
        Ok(Err(error)) => {
            tracing::debug!("Observer: {} failed in {:?}: {}", observer.name(), execution_time, error);
            record_failure(observer, ctx, error);
        }
        Err(_elapsed) => {
            tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
            let error = ObserverError::TimeoutError(format!(
                "Observer {} timed out after {:?}",
                observer.name(),
                observer.timeout()
            ));
            record_failure(observer, ctx, error);
        }
    }
}

/// Failures after the write are reported as warnings; the stored record stands
fn record_failure(observer: &dyn Observer, ctx: &mut ObserverContext, error: ObserverError) {
    let ring = observer.ring();
    if ring.is_post_database() {
        tracing::warn!("Observer: {} failed after the write in ring {:?}: {}", observer.name(), ring, error);
        ctx.add_warning(ObserverWarning::new(observer.name(), ring, error.to_string()));
    } else {
        ctx.add_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections;
    use crate::database::{MemoryStore, Record, Store};
    use crate::types::Operation;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Failing(ObserverRing);

    #[async_trait]
    impl Observer for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }
        fn ring(&self) -> ObserverRing {
            self.0
        }
        fn applies_to_operation(&self, _op: Operation) -> bool {
            true
        }
        async fn execute(&self, _ctx: &mut ObserverContext) -> Result<(), ObserverError> {
            Err(ObserverError::ValidationError("nope".to_string()))
        }
    }

    struct Counting(ObserverRing, Arc<AtomicUsize>);

    #[async_trait]
    impl Observer for Counting {
        fn name(&self) -> &'static str {
            "Counting"
        }
        fn ring(&self) -> ObserverRing {
            self.0
        }
        fn applies_to_operation(&self, _op: Operation) -> bool {
            true
        }
        async fn execute(&self, _ctx: &mut ObserverContext) -> Result<(), ObserverError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Slow;

    #[async_trait]
    impl Observer for Slow {
        fn name(&self) -> &'static str {
            "Slow"
        }
        fn ring(&self) -> ObserverRing {
            ObserverRing::Business
        }
        fn applies_to_operation(&self, _op: Operation) -> bool {
            true
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }
        async fn execute(&self, _ctx: &mut ObserverContext) -> Result<(), ObserverError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    fn context(store: Arc<dyn Store>) -> ObserverContext {
        let record = Record::from_api_input(json!({ "name": "Corner Shop" })).unwrap();
        ObserverContext::new(
            Operation::Create,
            collections::lookup(collections::BUSINESSES).unwrap(),
            None,
            store,
            vec![record],
        )
        .as_system()
    }

    #[tokio::test]
    async fn pre_database_error_stops_later_rings() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(Failing(ObserverRing::InputValidation));
        pipeline.register_observer(Counting(ObserverRing::Database, counter.clone()));

        let result = pipeline.execute(context(Arc::new(MemoryStore::new()))).await;
        assert!(!result.success());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(result.rings_executed.last(), Some(&ObserverRing::InputValidation));
    }

    #[tokio::test]
    async fn same_ring_observers_all_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(Counting(ObserverRing::InputValidation, counter.clone()));
        pipeline.register_observer(Failing(ObserverRing::InputValidation));
        pipeline.register_observer(Counting(ObserverRing::InputValidation, counter.clone()));

        let result = pipeline.execute(context(Arc::new(MemoryStore::new()))).await;
        assert_eq!(result.errors.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn post_database_failure_is_a_warning() {
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(Failing(ObserverRing::PostDatabase));
        let result = pipeline.execute(context(Arc::new(MemoryStore::new()))).await;
        assert!(result.success());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].observer, "Failing");
    }

    #[tokio::test]
    async fn slow_observer_times_out() {
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(Slow);
        let result = pipeline.execute(context(Arc::new(MemoryStore::new()))).await;
        assert!(matches!(result.errors.as_slice(), [ObserverError::TimeoutError(_)]));
    }
}
