//! Generator library: a registry of named value generators.
//!
//! Generators are addressed by dotted paths (`person.fullName`,
//! `internet.email`) and are registered explicitly, so the full set of valid
//! paths can be listed and checked before a run starts.
//!
//! The [`Faker`] handle pairs a registry with the run's random number
//! generator. It is what custom field generators receive.

mod builtin;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A registered generator: produces one value from the run's RNG.
pub type GeneratorFn = Arc<dyn Fn(&mut StdRng) -> Value + Send + Sync>;

static BUILTIN: Lazy<Arc<GeneratorRegistry>> = Lazy::new(|| {
    let mut registry = GeneratorRegistry::new();
    builtin::register_builtins(&mut registry);
    Arc::new(registry)
});

/// Registry of generators keyed by dotted path.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, GeneratorFn>,
}

impl GeneratorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry with all built-in generators
    pub fn builtin() -> Arc<GeneratorRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Register (or replace) a generator under a dotted path
    pub fn register<F>(&mut self, path: impl Into<String>, generator: F) -> &mut Self
    where
        F: Fn(&mut StdRng) -> Value + Send + Sync + 'static,
    {
        self.generators.insert(path.into(), Arc::new(generator));
        self
    }

    pub fn get(&self, path: &str) -> Option<&GeneratorFn> {
        self.generators.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.generators.contains_key(path)
    }

    /// All registered paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Distinct top-level namespaces, sorted
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self
            .paths()
            .map(|p| p.split('.').next().unwrap_or(p).to_string())
            .collect();
        namespaces.dedup();
        namespaces
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Generator library handle passed to custom field generators.
pub struct Faker {
    registry: Arc<GeneratorRegistry>,
    rng: StdRng,
}

impl Faker {
    pub fn new(registry: Arc<GeneratorRegistry>, rng: StdRng) -> Self {
        Self { registry, rng }
    }

    /// Create a handle with a seeded RNG, or a random seed when `None`
    pub fn with_seed(registry: Arc<GeneratorRegistry>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self::new(registry, StdRng::seed_from_u64(seed))
    }

    /// Invoke the generator registered at `path`
    pub fn call(&mut self, path: &str) -> Option<Value> {
        let generator = self.registry.get(path)?;
        Some(generator(&mut self.rng))
    }

    /// Random number generator for the current run
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// True with the given probability (clamped to 0.0..=1.0)
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    /// Uniformly pick one item, or `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..items.len());
        items.get(idx)
    }
}

impl fmt::Debug for Faker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Faker")
            .field("generators", &self.registry.len())
            .finish()
    }
}
