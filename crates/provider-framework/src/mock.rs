//! # Mock Store & Testing Guide
//!
//! `MockStore<A>` implements [`Store<A>`] entirely in memory from a queue of expectations.
//! It lets adapter and model tests run without a backend, and makes failure paths
//! (404s, API errors) trivial to reproduce.
//!
//! | Feature | MockStore | HTTP client + mock server |
//! |---------|-----------|---------------------------|
//! | **Speed** | Instant | Fast, but binds a socket |
//! | **Checks** | Call order and keys | Paths, headers, bodies |
//! | **Use Case** | Adapter lifecycle and model mapping | Wire format |
//!
//! ```rust
//! use provider_framework::mock::MockStore;
//! use provider_framework::{FrameworkError, ResourceKey, Store};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockStore::<String>::new();
//!     mock.expect_read(ResourceKey::new("a"))
//!         .return_err(FrameworkError::NotFound("a".into()));
//!
//!     let result = mock.read(&ResourceKey::new("a")).await;
//!     assert!(matches!(result, Err(FrameworkError::NotFound(_))));
//!     mock.verify();
//! }
//! ```
//!
//! Expectations are consumed in order. A call that does not match the next expectation
//! (wrong operation or wrong key) panics, as does a call with no expectation left.

use crate::error::FrameworkError;
use crate::model::ResourceKey;
use crate::store::Store;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Expectation<A> {
    Create {
        response: Result<A, FrameworkError>,
    },
    Read {
        key: ResourceKey,
        response: Result<A, FrameworkError>,
    },
    Update {
        key: ResourceKey,
        response: Result<A, FrameworkError>,
    },
    Delete {
        key: ResourceKey,
        response: Result<(), FrameworkError>,
    },
}

impl<A> Expectation<A> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Create { .. } => "create",
            Expectation::Read { .. } => "read",
            Expectation::Update { .. } => "update",
            Expectation::Delete { .. } => "delete",
        }
    }
}

/// A call the mock received, kept for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Received<A> {
    Create { parents: Vec<String>, object: A },
    Read { key: ResourceKey },
    Update { key: ResourceKey, object: A },
    Delete { key: ResourceKey },
}

struct Inner<A> {
    expectations: VecDeque<Expectation<A>>,
    received: Vec<Received<A>>,
}

/// A store backed by an expectation queue. Clones share the same queue, so a test keeps
/// one handle while the adapter owns another.
pub struct MockStore<A> {
    inner: Arc<Mutex<Inner<A>>>,
}

impl<A> Clone for MockStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A> Default for MockStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> MockStore<A> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                expectations: VecDeque::new(),
                received: Vec::new(),
            })),
        }
    }

    fn push(&self, expectation: Expectation<A>) {
        self.inner.lock().unwrap().expectations.push_back(expectation);
    }

    fn next(&self, call: &str) -> Expectation<A> {
        self.inner
            .lock()
            .unwrap()
            .expectations
            .pop_front()
            .unwrap_or_else(|| panic!("Unexpected {call}: no expectations left"))
    }

    pub fn expect_create(&self) -> ExpectationBuilder<'_, A, A> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(|response| Expectation::Create { response }),
        }
    }

    pub fn expect_read(&self, key: ResourceKey) -> ExpectationBuilder<'_, A, A> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::Read { key, response }),
        }
    }

    pub fn expect_update(&self, key: ResourceKey) -> ExpectationBuilder<'_, A, A> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::Update { key, response }),
        }
    }

    pub fn expect_delete(&self, key: ResourceKey) -> ExpectationBuilder<'_, A, ()> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::Delete { key, response }),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let inner = self.inner.lock().unwrap();
        if !inner.expectations.is_empty() {
            let pending: Vec<&str> = inner.expectations.iter().map(Expectation::name).collect();
            panic!(
                "Not all expectations were met. {} remaining: {pending:?}",
                pending.len()
            );
        }
    }
}

impl<A: Clone> MockStore<A> {
    /// Every call received so far, in order.
    pub fn received(&self) -> Vec<Received<A>> {
        self.inner.lock().unwrap().received.clone()
    }

    /// Objects passed to `create` and `update`, in order.
    pub fn sent_objects(&self) -> Vec<A> {
        self.received()
            .into_iter()
            .filter_map(|r| match r {
                Received::Create { object, .. } | Received::Update { object, .. } => Some(object),
                _ => None,
            })
            .collect()
    }

    fn record(&self, received: Received<A>) {
        self.inner.lock().unwrap().received.push(received);
    }
}

/// Finishes an expectation with the response the mock should return.
pub struct ExpectationBuilder<'a, A, R> {
    mock: &'a MockStore<A>,
    build: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<A> + 'a>,
}

impl<A, R> ExpectationBuilder<'_, A, R> {
    pub fn return_ok(self, value: R) {
        self.mock.push((self.build)(Ok(value)));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.mock.push((self.build)(Err(error)));
    }
}

fn check_key(call: &str, expected: &ResourceKey, actual: &ResourceKey) {
    assert_eq!(expected, actual, "{call} called with an unexpected key");
}

#[async_trait]
impl<A> Store<A> for MockStore<A>
where
    A: Clone + Send + Sync + 'static,
{
    async fn create(&self, parents: &[String], object: &A) -> Result<A, FrameworkError> {
        self.record(Received::Create {
            parents: parents.to_vec(),
            object: object.clone(),
        });
        match self.next("create") {
            Expectation::Create { response } => response,
            other => panic!("Expected {}, got create", other.name()),
        }
    }

    async fn read(&self, key: &ResourceKey) -> Result<A, FrameworkError> {
        self.record(Received::Read { key: key.clone() });
        match self.next("read") {
            Expectation::Read { key: expected, response } => {
                check_key("read", &expected, key);
                response
            }
            other => panic!("Expected {}, got read", other.name()),
        }
    }

    async fn update(&self, key: &ResourceKey, object: &A) -> Result<A, FrameworkError> {
        self.record(Received::Update {
            key: key.clone(),
            object: object.clone(),
        });
        match self.next("update") {
            Expectation::Update { key: expected, response } => {
                check_key("update", &expected, key);
                response
            }
            other => panic!("Expected {}, got update", other.name()),
        }
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        self.record(Received::Delete { key: key.clone() });
        match self.next("delete") {
            Expectation::Delete { key: expected, response } => {
                check_key("delete", &expected, key);
                response
            }
            other => panic!("Expected {}, got delete", other.name()),
        }
    }
}
