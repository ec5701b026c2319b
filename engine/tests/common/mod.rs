//! FILENAME: tests/common/mod.rs
//! Test fixtures for cloud-engine integration tests.

#![allow(dead_code)]

use cloud_engine::{Axis, Cloud, Record, Value};

/// Sales rows: (region, year, product, amount).
pub struct SalesFixture;

impl SalesFixture {
    pub fn data() -> Vec<(&'static str, i64, &'static str, f64)> {
        vec![
            ("EU", 2020, "Widget", 120.0),
            ("EU", 2020, "Gadget", 80.0),
            ("EU", 2021, "Widget", 150.0),
            ("US", 2020, "Widget", 200.0),
            ("US", 2021, "Gadget", 90.0),
            ("US", 2021, "Gadget", 60.0),
            ("APAC", 2021, "Widget", 40.0),
        ]
    }

    pub fn records() -> Vec<Record> {
        Self::data()
            .into_iter()
            .map(|(region, year, product, amount)| {
                Record::new()
                    .with("region", region)
                    .with("year", year)
                    .with("product", product)
                    .with("amount", amount)
            })
            .collect()
    }

    pub fn total() -> f64 {
        Self::data().iter().map(|r| r.3).sum()
    }
}

/// A plain struct row, projected with explicit closures instead of field names.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: u32,
    pub team: String,
    pub priority: u8,
    pub open: bool,
}

impl Ticket {
    pub fn new(id: u32, team: &str, priority: u8, open: bool) -> Self {
        Ticket {
            id,
            team: team.to_string(),
            priority,
            open,
        }
    }
}

pub fn tickets() -> Vec<Ticket> {
    vec![
        Ticket::new(1, "core", 1, true),
        Ticket::new(2, "core", 2, false),
        Ticket::new(3, "web", 1, true),
        Ticket::new(4, "core", 1, true),
        Ticket::new(5, "web", 3, true),
    ]
}

/// Cloud of tickets by team and priority; each point collects ticket ids.
pub fn ticket_cloud() -> Cloud<Ticket, Vec<u32>> {
    Cloud::with_generator(
        vec![
            Axis::new("team", |t: &Ticket| Value::text(t.team.clone())),
            Axis::new("priority", |t: &Ticket| Value::Int(t.priority as i64)),
        ],
        Vec::new,
    )
    .expect("axis names are unique")
}

/// Region × year cloud summing `amount`.
pub fn sales_cloud() -> Cloud<Record, f64> {
    let mut cloud = Cloud::with_constant(vec![Axis::field("region"), Axis::field("year")], 0.0)
        .expect("axis names are unique");
    cloud
        .load_data_with(SalesFixture::records(), |row, cur| {
            cur + row.number("amount").unwrap_or(0.0)
        })
        .expect("fixture rows carry every axis field");
    cloud
}
