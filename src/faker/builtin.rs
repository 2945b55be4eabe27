//! Built-in generators, backed by the `fake` crate.
//!
//! Paths follow the `namespace.generatorName` convention of common faker
//! libraries so existing seed schemas carry over unchanged.

use super::GeneratorRegistry;
use chrono::{Duration, SecondsFormat, Utc};
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, StateName, StreetName, ZipCode,
};
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::internet::en::{FreeEmail, SafeEmail, Username};
use fake::faker::job::en::Title as JobTitle;
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

const DAY_SECS: i64 = 24 * 60 * 60;
const YEAR_SECS: i64 = 365 * DAY_SECS;

const PRODUCT_ADJECTIVES: &[&str] = &[
    "Ergonomic", "Rustic", "Sleek", "Handcrafted", "Licensed", "Refined", "Practical",
    "Intelligent", "Gorgeous", "Incredible", "Fantastic", "Small", "Tasty", "Generic",
];

const PRODUCT_MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal",
    "Soft", "Fresh", "Frozen", "Bronze",
];

const PRODUCT_NOUNS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants",
    "Shirt", "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese",
    "Bacon", "Pizza", "Salad", "Sausages", "Chips",
];

const DEPARTMENTS: &[&str] = &[
    "Books", "Movies", "Music", "Games", "Electronics", "Computers", "Home", "Garden",
    "Tools", "Grocery", "Health", "Beauty", "Toys", "Kids", "Baby", "Clothing", "Shoes",
    "Jewelry", "Sports", "Outdoors", "Automotive", "Industrial",
];

const TOP_LEVEL_DOMAINS: &[&str] = &["com", "net", "org", "io", "dev", "info"];

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub(super) fn register_builtins(registry: &mut GeneratorRegistry) {
    // Person
    registry
        .register("person.fullName", |rng| Value::String(Name().fake_with_rng(rng)))
        .register("person.firstName", |rng| {
            Value::String(FirstName().fake_with_rng(rng))
        })
        .register("person.lastName", |rng| {
            Value::String(LastName().fake_with_rng(rng))
        })
        .register("person.jobTitle", |rng| {
            Value::String(JobTitle().fake_with_rng(rng))
        });

    // Internet
    registry
        .register("internet.email", |rng| {
            Value::String(FreeEmail().fake_with_rng(rng))
        })
        .register("internet.exampleEmail", |rng| {
            Value::String(SafeEmail().fake_with_rng(rng))
        })
        .register("internet.userName", |rng| {
            Value::String(Username().fake_with_rng(rng))
        })
        .register("internet.domainName", |rng| Value::String(domain_name(rng)))
        .register("internet.url", |rng| {
            Value::String(format!("https://{}", domain_name(rng)))
        })
        .register("internet.ipv4", |rng| {
            Value::String(format!(
                "{}.{}.{}.{}",
                rng.random_range(1..255),
                rng.random_range(0..255),
                rng.random_range(0..255),
                rng.random_range(1..255)
            ))
        })
        .register("internet.ipv6", |rng| {
            let groups: Vec<String> = (0..8)
                .map(|_| format!("{:x}", rng.random_range(0..0xFFFF_u16)))
                .collect();
            Value::String(groups.join(":"))
        });

    // Company and commerce
    registry
        .register("company.name", |rng| {
            Value::String(CompanyName().fake_with_rng(rng))
        })
        .register("company.catchPhrase", |rng| {
            Value::String(CatchPhrase().fake_with_rng(rng))
        })
        .register("commerce.productName", |rng| {
            Value::String(format!(
                "{} {} {}",
                pick(rng, PRODUCT_ADJECTIVES),
                pick(rng, PRODUCT_MATERIALS),
                pick(rng, PRODUCT_NOUNS)
            ))
        })
        .register("commerce.department", |rng| {
            Value::String(pick(rng, DEPARTMENTS).to_string())
        })
        .register("commerce.price", |rng| {
            let cents: i64 = rng.random_range(100..100_000);
            Value::from(cents as f64 / 100.0)
        });

    // Text
    registry
        .register("lorem.word", |rng| Value::String(Word().fake_with_rng(rng)))
        .register("lorem.words", |rng| {
            let words: Vec<String> = Words(3..6).fake_with_rng(rng);
            Value::String(words.join(" "))
        })
        .register("lorem.sentence", |rng| {
            Value::String(Sentence(5..10).fake_with_rng(rng))
        })
        .register("lorem.paragraph", |rng| {
            Value::String(Paragraph(3..5).fake_with_rng(rng))
        });

    // Location and phone
    registry
        .register("location.city", |rng| {
            Value::String(CityName().fake_with_rng(rng))
        })
        .register("location.state", |rng| {
            Value::String(StateName().fake_with_rng(rng))
        })
        .register("location.country", |rng| {
            Value::String(CountryName().fake_with_rng(rng))
        })
        .register("location.zipCode", |rng| {
            Value::String(ZipCode().fake_with_rng(rng))
        })
        .register("location.street", |rng| {
            Value::String(StreetName().fake_with_rng(rng))
        })
        .register("location.streetAddress", |rng| {
            let number: String = BuildingNumber().fake_with_rng(rng);
            let street: String = StreetName().fake_with_rng(rng);
            Value::String(format!("{} {}", number, street))
        })
        .register("phone.number", |rng| {
            Value::String(PhoneNumber().fake_with_rng(rng))
        });

    // Primitive values
    registry
        .register("number.int", |rng| Value::from(rng.random_range(0..=1_000_000_i64)))
        .register("number.float", |rng| {
            let value: f64 = rng.random_range(0.0..1000.0);
            Value::from((value * 100.0).round() / 100.0)
        })
        .register("datatype.boolean", |rng| Value::Bool(rng.random_bool(0.5)))
        .register("string.uuid", |rng| Value::String(uuid_v4(rng)))
        .register("string.alphanumeric", |rng| {
            let s: String = (0..10)
                .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
                .collect();
            Value::String(s)
        });

    // Dates, as ISO-8601 strings relative to now
    registry
        .register("date.past", |rng| offset_timestamp(rng, -YEAR_SECS, 0))
        .register("date.recent", |rng| offset_timestamp(rng, -DAY_SECS, 0))
        .register("date.future", |rng| offset_timestamp(rng, 0, YEAR_SECS))
        .register("date.soon", |rng| offset_timestamp(rng, 0, DAY_SECS))
        .register("date.birthdate", |rng| {
            offset_timestamp(rng, -80 * YEAR_SECS, -18 * YEAR_SECS)
        });
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn domain_name(rng: &mut StdRng) -> String {
    let word: String = Word().fake_with_rng(rng);
    format!("{}.{}", word.to_lowercase(), pick(rng, TOP_LEVEL_DOMAINS))
}

fn uuid_v4(rng: &mut StdRng) -> String {
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        rng.random::<u32>(),
        rng.random::<u16>(),
        (rng.random::<u16>() & 0x0FFF) | 0x4000, // Version 4
        (rng.random::<u16>() & 0x3FFF) | 0x8000, // Variant
        rng.random::<u64>() & 0xFFFFFFFFFFFF_u64
    )
}

/// Timestamp at a random offset (in seconds) from now, `min..max`
fn offset_timestamp(rng: &mut StdRng, min: i64, max: i64) -> Value {
    let offset = rng.random_range(min..max.max(min + 1));
    let ts = Utc::now() + Duration::seconds(offset);
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
