// Copyright 2025 the DataLab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `datalab_expr` and `datalab_transforms`.
//!
//! Set `RUST_LOG=datalab_transforms=debug` to see per-transform row counts.

use std::error::Error;

use datalab_core::{CellValue, Row, Table};
use datalab_expr::{DEFAULT_PREVIEW_CAP, count_matches, try_evaluate, try_filter};
use datalab_transforms::{ConditionalStyles, FilterOp, Program, StyleRule, Transform};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("datalab_examples=info".parse()?),
        )
        .init();

    let base = Table::new(
        "orders.csv",
        ["Region", "City", "Unit Price", "Qty", "Returned"]
            .map(String::from)
            .to_vec(),
    )?
    .with_rows(vec![
        order("West", "Seattle", 12.5, 4, false),
        order("East", "Boston", 8.0, 10, true),
        order("West", "Portland", 20.0, 1, false),
        order("South", "Austin", 15.0, 6, false),
    ]);

    // Validation as the user types.
    for text in ["{Unit Price} > 10 AND NOT Returned", "Qty BETWEEN 2 AND", "City ~ '(unclosed'"] {
        let check = try_filter(text, &base.rows[0]);
        match check.error {
            None => println!("filter ok:      {text}"),
            Some(err) => println!("filter invalid: {text}  ({err})"),
        }
    }
    let preview = count_matches(&base.rows, "Region = 'West'", DEFAULT_PREVIEW_CAP);
    println!("preview: {} of {} rows match", preview.count, base.row_count());
    for text in ["{Unit Price} * Qty", "Qty / (Qty - Qty)"] {
        let check = try_evaluate(text, &base.rows[0]);
        println!("{text} => {:?}", check.value);
    }

    let program = Program::new()
        .with(Transform::filter_rows("Region", FilterOp::In, "west, south"))
        .with(Transform::compute("Total", "{Unit Price} * Qty"))
        .with(Transform::filter("Total >= 50 OR City LIKE 'P%'"))
        .with(Transform::row_average(["Unit Price", "Qty"], "Mean"));
    let out = program.apply(&base)?;
    tracing::info!(rows = out.row_count(), "program applied");

    let styles = ConditionalStyles::compile([
        StyleRule::new("large", "Total >= 80").with_color("#d62728"),
        StyleRule::new("single", "Qty == 1")
            .with_stroke("#1f77b4")
            .with_size(3.0),
    ])?;

    println!("{}", out.name);
    println!("{}", out.headers.join(" | "));
    for row in &out.rows {
        let cells: Vec<String> = out
            .headers
            .iter()
            .map(|h| row.get(h).map(CellValue::to_text).unwrap_or_default())
            .collect();
        let style = styles.resolve(row);
        println!("{}  {:?}", cells.join(" | "), style);
    }
    Ok(())
}

fn order(region: &str, city: &str, price: f64, qty: i32, returned: bool) -> Row {
    Row::new()
        .with("Region", region)
        .with("City", city)
        .with("Unit Price", price)
        .with("Qty", qty)
        .with("Returned", returned)
}
