//! Seed run orchestration.
//!
//! A run connects the adapter, orders the tables, then per table generates
//! records, inserts them and records the inserted rows for later references:
//!
//! ```text
//! Starting → { TableStart → Generating → [Inserting] → TableComplete }* → Complete
//! ```
//!
//! The adapter is disconnected exactly once on every exit path.

use crate::adapter::{ConnectionConfig, StorageAdapter};
use crate::error::SeedError;
use crate::faker::{Faker, GeneratorRegistry};
use crate::generator::generate_table;
use crate::schema::{Schema, SchemaGraph};
use crate::store::RelationshipStore;
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Lifecycle of a seeder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedState {
    #[default]
    Idle,
    Connected,
    /// Processing the table at this position of the execution order
    Seeding(usize),
    Completed,
    Failed,
}

/// Progress event emitted during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SeedEvent {
    Starting {
        total_tables: usize,
        total_records: u64,
    },
    TableStart {
        table: String,
        /// Zero-based position in the execution order
        table_index: usize,
        total_tables: usize,
    },
    Generating {
        table: String,
        records_generated: usize,
    },
    Inserting {
        table: String,
        records_inserted: usize,
    },
    TableComplete {
        table: String,
        /// Number of tables completed so far
        table_index: usize,
        total_tables: usize,
    },
    Complete {
        elapsed_secs: f64,
    },
}

/// Per-table outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TableSeedStats {
    pub name: String,
    pub generated: usize,
    pub inserted: usize,
    /// True when the table generated no records and was not inserted
    pub skipped: bool,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SeedSummary {
    /// Tables in the order they were processed
    pub order: Vec<String>,
    pub tables: Vec<TableSeedStats>,
    /// Rows inserted across all tables
    pub total_records: u64,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tables, {} records seeded in {:.2}s",
            self.tables.len(),
            self.total_records,
            self.elapsed_secs
        )
    }
}

type ProgressFn = Box<dyn FnMut(&SeedEvent) + Send>;

#[derive(Default)]
pub struct SeederConfig {
    /// RNG seed; a random one is drawn per run when `None`
    pub seed: Option<u64>,
    pub progress_fn: Option<ProgressFn>,
}

/// Drives seed runs against one storage adapter
pub struct Seeder<A: StorageAdapter> {
    adapter: A,
    registry: Arc<GeneratorRegistry>,
    config: SeederConfig,
    state: SeedState,
}

impl<A: StorageAdapter> Seeder<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            registry: GeneratorRegistry::builtin(),
            config: SeederConfig::default(),
            state: SeedState::Idle,
        }
    }

    pub fn with_registry(mut self, registry: Arc<GeneratorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_progress<F: FnMut(&SeedEvent) + Send + 'static>(mut self, f: F) -> Self {
        self.config.progress_fn = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> SeedState {
        self.state
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Seed every table of `schema`.
    ///
    /// Any error aborts the run; tables already inserted stay inserted.
    pub fn seed(
        &mut self,
        schema: &Schema,
        connection: &ConnectionConfig,
    ) -> Result<SeedSummary, SeedError> {
        let start = Instant::now();
        let mut run = Run {
            store: RelationshipStore::new(),
            faker: Faker::with_seed(Arc::clone(&self.registry), self.config.seed),
            progress: self.config.progress_fn.as_mut(),
            state: &mut self.state,
        };

        let mut session = Session::new(&mut self.adapter);
        let result = run.execute(&mut session, schema, connection, start);
        session.close();

        match result {
            Ok(summary) => {
                *run.state = SeedState::Completed;
                info!(%summary, "seed complete");
                Ok(summary)
            }
            Err(e) => {
                *run.state = SeedState::Failed;
                error!(error = %e, "seed failed");
                Err(e)
            }
        }
    }
}

/// Adapter connection scope. Disconnects once, when closed or dropped.
struct Session<'a, A: StorageAdapter> {
    adapter: &'a mut A,
    closed: bool,
}

impl<'a, A: StorageAdapter> Session<'a, A> {
    fn new(adapter: &'a mut A) -> Self {
        Self {
            adapter,
            closed: false,
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.adapter.disconnect();
            debug!(adapter = self.adapter.name(), "disconnected");
        }
    }
}

impl<A: StorageAdapter> Drop for Session<'_, A> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Per-run state, borrowed from the seeder for the duration of one run
struct Run<'a> {
    store: RelationshipStore,
    faker: Faker,
    progress: Option<&'a mut ProgressFn>,
    state: &'a mut SeedState,
}

impl Run<'_> {
    fn emit(&mut self, event: SeedEvent) {
        if let Some(cb) = self.progress.as_mut() {
            cb(&event);
        }
    }

    fn execute<A: StorageAdapter>(
        &mut self,
        session: &mut Session<'_, A>,
        schema: &Schema,
        connection: &ConnectionConfig,
        start: Instant,
    ) -> Result<SeedSummary, SeedError> {
        let adapter_name = session.adapter.name();
        session.adapter.connect(connection)?;
        *self.state = SeedState::Connected;
        debug!(adapter = adapter_name, "connected");

        let graph = SchemaGraph::from_schema(schema);
        let order = graph.execution_order()?;
        schema.validate_generators(self.faker.registry())?;

        let total_tables = order.len();
        let tables: Vec<_> = order.iter().filter_map(|&id| schema.table(id)).collect();
        let order_names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        info!(
            tables = total_tables,
            records = schema.total_records(),
            adapter = adapter_name,
            "seeding {}",
            order_names.join(" → ")
        );

        self.emit(SeedEvent::Starting {
            total_tables,
            total_records: schema.total_records(),
        });

        let mut stats = Vec::with_capacity(total_tables);
        for (i, table) in tables.into_iter().enumerate() {
            *self.state = SeedState::Seeding(i);
            self.emit(SeedEvent::TableStart {
                table: table.name.clone(),
                table_index: i,
                total_tables,
            });

            let records = generate_table(table, &self.store, &mut self.faker)?;
            let generated = records.len();
            self.emit(SeedEvent::Generating {
                table: table.name.clone(),
                records_generated: generated,
            });

            let inserted = if records.is_empty() {
                debug!(table = %table.name, "no records generated, skipping insert");
                0
            } else {
                let rows = session.adapter.insert(&table.name, records)?;
                let inserted = rows.len();
                self.emit(SeedEvent::Inserting {
                    table: table.name.clone(),
                    records_inserted: inserted,
                });
                self.store.add_records(&table.name, rows);
                inserted
            };

            info!(table = %table.name, generated, inserted, "table seeded");
            self.emit(SeedEvent::TableComplete {
                table: table.name.clone(),
                table_index: i + 1,
                total_tables,
            });
            stats.push(TableSeedStats {
                name: table.name.clone(),
                generated,
                inserted,
                skipped: generated == 0,
            });
        }

        let elapsed_secs = start.elapsed().as_secs_f64();
        self.emit(SeedEvent::Complete { elapsed_secs });

        Ok(SeedSummary {
            order: order_names,
            total_records: stats.iter().map(|s| s.inserted as u64).sum(),
            tables: stats,
            elapsed_secs,
        })
    }
}
