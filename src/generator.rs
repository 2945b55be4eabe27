//! Field generation: turns one table specification into records.

use crate::error::SeedError;
use crate::faker::Faker;
use crate::schema::{FieldSpec, Record, TableSpec};
use crate::store::{RelationshipStore, StoreSnapshot};
use serde_json::Value;

/// Generate exactly `table.count` records for one table.
///
/// References are resolved against `store`, which holds only rows that were
/// already inserted. A table referencing itself therefore draws parents from
/// earlier runs of the same table, never from the batch being built; with no
/// stored rows the reference resolves to `null`.
pub fn generate_table(
    table: &TableSpec,
    store: &RelationshipStore,
    faker: &mut Faker,
) -> Result<Vec<Record>, SeedError> {
    // The store cannot change while a table is generated
    let snapshot = store.snapshot();

    let mut records = Vec::with_capacity(table.count);
    for _ in 0..table.count {
        let mut record = Record::new();
        for (field, spec) in &table.fields {
            let value = resolve_field(table, field, spec, store, &snapshot, faker)?;
            record.insert(field.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn resolve_field(
    table: &TableSpec,
    field: &str,
    spec: &FieldSpec,
    store: &RelationshipStore,
    snapshot: &StoreSnapshot,
    faker: &mut Faker,
) -> Result<Value, SeedError> {
    match spec {
        FieldSpec::Literal(path) => {
            faker
                .call(path)
                .ok_or_else(|| SeedError::UnknownGenerator {
                    table: table.name.clone(),
                    field: field.to_string(),
                    path: path.clone(),
                    namespaces: faker.registry().namespaces(),
                })
        }
        FieldSpec::Custom(generate) => Ok(generate(faker, snapshot)),
        FieldSpec::Reference {
            table: target,
            field: target_field,
        } => {
            if *target == table.name && !store.has_records(target) {
                return Ok(Value::Null);
            }
            let parent = store.random_record(target, faker.rng())?;
            parent
                .get(target_field)
                .cloned()
                .ok_or_else(|| SeedError::MissingReferenceField {
                    table: target.clone(),
                    field: target_field.clone(),
                })
        }
    }
}
