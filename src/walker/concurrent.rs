use crate::base::scope::matches;
use crate::base::{ElementHandler, HandlerContext, Scope};
use crate::errors::{Result, WalkError};
use crate::types::Selector;
use crate::walker::{dispatch, WalkConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// One matched element paired with the selector that matched it.
pub struct WorkItem<S: Scope, R: Send + 'static> {
    pub selector: Selector,
    pub element: S::Element,
    handler: Arc<dyn ElementHandler<S, R>>,
}

/// Queries every selector up front, then runs all handlers concurrently.
///
/// The scope is mandatory as soon as there is a selector to query. Result
/// slot `i` always belongs to worklist entry `i`, whatever order the
/// handlers finish in. No timeout is applied: a handler that never settles
/// keeps the call pending.
pub struct ConcurrentWalker;

impl ConcurrentWalker {
    pub async fn run<S, R>(config: impl Into<Arc<WalkConfig<S, R>>>) -> Result<Vec<R>>
    where
        S: Scope,
        R: From<Selector> + Send + 'static,
    {
        let config = config.into();
        let exception_handler = config.resolve_exception_handler();
        let worklist = Self::worklist(&config)?;
        let total = worklist.len();

        let mut tasks = JoinSet::new();
        let mut owners = HashMap::with_capacity(total);
        for (index, item) in worklist.into_iter().enumerate() {
            let exception_handler = Arc::clone(&exception_handler);
            let ctx = HandlerContext {
                element: item.element,
                selector: item.selector.clone(),
                config: Arc::clone(&config),
            };
            let handler = item.handler;
            let task = tasks.spawn(async move {
                let outcome = dispatch(handler.as_ref(), exception_handler.as_ref(), ctx).await;
                (index, outcome)
            });
            owners.insert(task.id(), item.selector);
        }
        debug!(tasks = total, "launched handlers");

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(value))) => slots[index] = Some(value),
                // Dropping the set aborts whatever is still running.
                Ok((_, Err(err))) => return Err(err),
                // Panics unwind into the caller, as they do for the sequential walker.
                Err(join_error) if join_error.is_panic() => {
                    std::panic::resume_unwind(join_error.into_panic())
                }
                Err(join_error) => {
                    let selector = owners
                        .remove(&join_error.id())
                        .unwrap_or_else(|| Selector::from("<unknown>"));
                    return Err(WalkError::TaskFailed {
                        selector,
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        let results: Vec<R> = slots.into_iter().flatten().collect();
        info!(results = results.len(), "concurrent walk complete");
        Ok(results)
    }

    /// Flatten every (selector, element) match, in declaration then match order.
    ///
    /// Built eagerly: a missing scope or failing query aborts before any
    /// handler runs.
    pub fn worklist<S, R>(config: &WalkConfig<S, R>) -> Result<Vec<WorkItem<S, R>>>
    where
        S: Scope,
        R: Send + 'static,
    {
        let mut worklist = Vec::new();
        for (selector, handler) in config.entries() {
            let scope = config.scope().ok_or_else(|| WalkError::MissingScope {
                selector: selector.clone(),
            })?;
            let elements = matches(scope.as_ref(), selector).map_err(|source| WalkError::Query {
                selector: selector.clone(),
                source,
            })?;
            debug!(selector = %selector, matches = elements.len(), "queried scope");

            worklist.extend(elements.into_iter().map(|element| WorkItem {
                selector: selector.clone(),
                element,
                handler: Arc::clone(handler),
            }));
        }
        Ok(worklist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, FixtureScope};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn worklist_is_flattened_in_declaration_order() {
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(
                FixtureScope::new()
                    .with_elements(".b", ["b1"])
                    .with_matches(".a", [Some("a1".into()), None, Some("a2".into())]),
            )
            .on(".a", |_| Ok(String::new()))
            .on(".b", |_| Ok(String::new()));

        let worklist = assert_ok!(ConcurrentWalker::worklist(&config));
        let pairs: Vec<_> = worklist
            .iter()
            .map(|item| format!("{}={}", item.selector, item.element))
            .collect();
        assert_eq!(pairs, vec![".a=a1", ".a=a2", ".b=b1"]);
    }

    #[tokio::test]
    async fn results_keep_worklist_order_despite_completion_order() {
        let finished = CallLog::new();
        let handler_log = finished.clone();
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(
                FixtureScope::new()
                    .with_elements(".a", ["30", "20"])
                    .with_elements(".b", ["10", "0"]),
            )
            .on_async(".a", {
                let log = handler_log.clone();
                move |ctx| {
                    let log = log.clone();
                    async move {
                        let delay: u64 = ctx.element.parse().unwrap_or(0);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        log.record(ctx.element.clone());
                        Ok(format!("a:{}", ctx.element))
                    }
                }
            })
            .on_async(".b", move |ctx| {
                let log = handler_log.clone();
                async move {
                    let delay: u64 = ctx.element.parse().unwrap_or(0);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    log.record(ctx.element.clone());
                    Ok(format!("b:{}", ctx.element))
                }
            });

        let results = assert_ok!(ConcurrentWalker::run(config).await);
        assert_eq!(results, vec!["a:30", "a:20", "b:10", "b:0"]);
        assert_eq!(finished.entries(), vec!["0", "10", "20", "30"]);
    }

    #[tokio::test]
    async fn handlers_are_launched_before_any_completes() {
        let started = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&started);
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(FixtureScope::new().with_elements("p", ["p1", "p2", "p3"]))
            .on_async("p", move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    // Wait until every unit has started.
                    while counter.load(Ordering::SeqCst) < 3 {
                        tokio::task::yield_now().await;
                    }
                    Ok(counter.load(Ordering::SeqCst).to_string())
                }
            });

        let results = assert_ok!(ConcurrentWalker::run(config).await);
        assert_eq!(results, vec!["3", "3", "3"]);
    }

    #[tokio::test]
    async fn missing_scope_fails_before_dispatch() {
        let calls = CallLog::new();
        let handler_log = calls.clone();
        let config = WalkConfig::<FixtureScope, String>::new().on(".a", move |ctx| {
            handler_log.record(ctx.selector.to_string());
            Ok(String::new())
        });

        let err = assert_err!(ConcurrentWalker::run(config).await);
        assert!(matches!(err, WalkError::MissingScope { .. }));
        assert_eq!(err.selector().map(|s| s.as_str()), Some(".a"));
        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn default_config_yields_empty_results() {
        let config = WalkConfig::<FixtureScope, String>::default();

        let results = assert_ok!(ConcurrentWalker::run(config).await);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn query_failure_prevents_all_handlers() {
        let calls = CallLog::new();
        let handler_log = calls.clone();
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(
                FixtureScope::new()
                    .with_elements(".a", ["a1"])
                    .failing(".b", "selector engine unavailable"),
            )
            .on(".a", move |ctx| {
                handler_log.record(ctx.element.clone());
                Ok(String::new())
            })
            .on(".b", |_| Ok(String::new()));

        let err = assert_err!(ConcurrentWalker::run(config).await);
        assert!(matches!(err, WalkError::Query { .. }));
        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn each_failure_reaches_the_exception_handler_once() {
        let failures = CallLog::new();
        let recovery_log = failures.clone();
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(
                FixtureScope::new()
                    .with_elements(".card", ["c1", "c2", "c3", "c4"])
                    .with_elements("#footer", ["f1"]),
            )
            .on(".card", |ctx| {
                if ctx.element == "c3" {
                    anyhow::bail!("bad card");
                }
                Ok(ctx.element.clone())
            })
            .on_async("#footer", |_| async move {
                Err(anyhow::anyhow!("no footer"))
            })
            .on_error_async(move |error, ctx| {
                let log = recovery_log.clone();
                async move {
                    log.record(format!("{}:{}:{}", ctx.selector, ctx.element, error));
                    Ok(format!("fallback {}", ctx.element))
                }
            });

        let results = assert_ok!(ConcurrentWalker::run(config).await);
        assert_eq!(
            results,
            vec!["c1", "c2", "fallback c3", "c4", "fallback f1"]
        );

        let mut entries = failures.entries();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                "#footer:f1:Handler rejected: no footer",
                ".card:c3:Handler threw: bad card",
            ]
        );
    }

    #[tokio::test]
    async fn exception_handler_failure_fails_the_call() {
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(FixtureScope::new().with_elements("a", ["a1", "a2"]))
            .on("a", |ctx| {
                if ctx.element == "a2" {
                    anyhow::bail!("broken link");
                }
                Ok(ctx.element.clone())
            })
            .on_error(|_, _| Err(anyhow::anyhow!("no recovery")));

        let err = assert_err!(ConcurrentWalker::run(config).await);
        assert!(matches!(err, WalkError::ExceptionHandler { .. }));
        assert_eq!(err.selector().map(|s| s.as_str()), Some("a"));
    }

    #[tokio::test]
    #[should_panic(expected = "decoder crashed")]
    async fn panicking_handler_unwinds_into_the_caller() {
        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(FixtureScope::new().with_elements("img", ["i1"]))
            .on("img", |_| panic!("decoder crashed"))
            .on_error(|_, _| Ok("recovered".to_string()));

        let _ = ConcurrentWalker::run(config).await;
    }
}
