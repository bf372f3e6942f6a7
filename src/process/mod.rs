// src/process/mod.rs
pub mod age_band;
pub mod date_parser;
pub mod numeric;

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int32Array, Int64Array,
        StringArray, UInt32Array,
    },
    compute::{cast, filter_record_batch, take},
    datatypes::{DataType, Date32Type, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use std::{cmp::Ordering, sync::Arc};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::schema::{
    self, AGE, AGE_BAND, CANONICAL_COLUMNS, CUSTOMER_ID, DATE, GENDER, MONTH, MONTH_NAME,
    PRICE_PER_UNIT, PRODUCT_CATEGORY, QUANTITY, TOTAL_AMOUNT, TRANSACTION_ID, YEAR,
};
use age_band::age_band;
use date_parser::parse_day_first;
use numeric::{clean_numeric, coerce_quantity};

/// Diagnostics gathered while transforming; none of these abort a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub rows_in: usize,
    pub dropped_invalid_date: usize,
    /// Values left missing after numeric coercion, per field (before any defaulting).
    pub missing_quantity: usize,
    pub missing_price: usize,
    pub missing_age: usize,
}

#[derive(Debug)]
pub struct Transformed {
    pub batch: RecordBatch,
    pub stats: TransformStats,
}

/// Clean and enrich a validated raw batch.
///
/// Order matters: header trim → date parse + drop → numeric coercion → total →
/// calendar columns → age band → column order → row order.
#[tracing::instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn transform(batch: RecordBatch) -> Result<Transformed> {
    let mut stats = TransformStats {
        rows_in: batch.num_rows(),
        ..Default::default()
    };

    // ─── 1) header names ─────────────────────────────────────────────
    let batch = normalize_headers(&batch)?;
    let headers: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    schema::validate_columns(&headers)?;

    // ─── 2) dates, dropping rows that do not parse ───────────────────
    let parsed: Vec<Option<NaiveDate>> = string_column(&batch, DATE)?
        .iter()
        .map(|v| v.and_then(parse_day_first))
        .collect();
    let keep = BooleanArray::from(parsed.iter().map(Option::is_some).collect::<Vec<bool>>());
    let batch = filter_record_batch(&batch, &keep)?;
    let dates: Vec<NaiveDate> = parsed.into_iter().flatten().collect();
    stats.dropped_invalid_date = stats.rows_in - batch.num_rows();
    info!(
        dropped = stats.dropped_invalid_date,
        "rows dropped for invalid date"
    );

    // ─── 3) numeric coercion ─────────────────────────────────────────
    let quantity: Vec<i64> = coerce_column(&batch, QUANTITY, &mut stats.missing_quantity)?
        .into_iter()
        .map(coerce_quantity)
        .collect();
    let price = coerce_column(&batch, PRICE_PER_UNIT, &mut stats.missing_price)?;
    let age = coerce_column(&batch, AGE, &mut stats.missing_age)?;
    debug!(
        quantity = stats.missing_quantity,
        price = stats.missing_price,
        age = stats.missing_age,
        "values missing after numeric coercion"
    );

    // ─── 4) total is always recomputed ───────────────────────────────
    let total: Float64Array = quantity
        .iter()
        .zip(&price)
        .map(|(q, p)| p.map(|p| *q as f64 * p))
        .collect();

    // ─── 5) calendar ─────────────────────────────────────────────────
    let date_col = Date32Array::from(
        dates
            .iter()
            .map(|d| Date32Type::from_naive_date(*d))
            .collect::<Vec<i32>>(),
    );
    let years = Int32Array::from(dates.iter().map(|d| d.year()).collect::<Vec<i32>>());
    let months = Int32Array::from(dates.iter().map(|d| d.month() as i32).collect::<Vec<i32>>());
    let month_names = StringArray::from(
        dates
            .iter()
            .map(|d| d.format("%B").to_string())
            .collect::<Vec<String>>(),
    );

    // ─── 6) age band ─────────────────────────────────────────────────
    let bands = StringArray::from(age.iter().map(|a| age_band(*a)).collect::<Vec<_>>());

    // ─── 7) canonical column order, then passthrough ─────────────────
    let mut fields: Vec<Field> = Vec::with_capacity(batch.num_columns() + 4);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() + 4);
    let mut push = |field: Field, col: ArrayRef| {
        fields.push(field);
        columns.push(col);
    };
    let (f, c) = passthrough(&batch, TRANSACTION_ID)?;
    push(f, c);
    push(Field::new(DATE, DataType::Date32, false), Arc::new(date_col));
    push(Field::new(YEAR, DataType::Int32, false), Arc::new(years));
    push(Field::new(MONTH, DataType::Int32, false), Arc::new(months));
    push(Field::new(MONTH_NAME, DataType::Utf8, false), Arc::new(month_names));
    for name in [CUSTOMER_ID, GENDER] {
        let (f, c) = passthrough(&batch, name)?;
        push(f, c);
    }
    push(
        Field::new(AGE, DataType::Float64, true),
        Arc::new(Float64Array::from(age)),
    );
    push(Field::new(AGE_BAND, DataType::Utf8, true), Arc::new(bands));
    let (f, c) = passthrough(&batch, PRODUCT_CATEGORY)?;
    push(f, c);
    push(
        Field::new(QUANTITY, DataType::Int64, false),
        Arc::new(Int64Array::from(quantity)),
    );
    push(
        Field::new(PRICE_PER_UNIT, DataType::Float64, true),
        Arc::new(Float64Array::from(price)),
    );
    push(Field::new(TOTAL_AMOUNT, DataType::Float64, true), Arc::new(total));

    for (field, col) in batch.schema().fields().iter().zip(batch.columns()) {
        if !CANONICAL_COLUMNS.contains(&field.name().as_str()) {
            push(field.as_ref().clone(), col.clone());
        }
    }
    let ordered = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

    // ─── 8) row order ────────────────────────────────────────────────
    let batch = sort_rows(&ordered, &dates)?;
    info!(rows = batch.num_rows(), "transformation complete");

    Ok(Transformed { batch, stats })
}

fn normalize_headers(batch: &RecordBatch) -> Result<RecordBatch> {
    let fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_name(f.name().trim()))
        .collect();
    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        batch.columns().to_vec(),
    )?)
}

fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| EtlError::Schema {
            missing: vec![name.to_string()],
        })
}

fn passthrough(batch: &RecordBatch, name: &str) -> Result<(Field, ArrayRef)> {
    let idx = column_index(batch, name)?;
    Ok((batch.schema().field(idx).clone(), batch.column(idx).clone()))
}

/// The named column as strings, casting if the source was typed.
fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let idx = column_index(batch, name)?;
    let col = cast(batch.column(idx), &DataType::Utf8)?;
    col.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| {
            EtlError::Transform(ArrowError::CastError(format!(
                "column {} is not Utf8",
                name
            )))
        })
}

fn coerce_column(
    batch: &RecordBatch,
    name: &str,
    missing: &mut usize,
) -> Result<Vec<Option<f64>>> {
    let col = string_column(batch, name)?;
    Ok(col
        .iter()
        .map(|v| {
            let parsed = v.and_then(clean_numeric);
            if parsed.is_none() {
                *missing += 1;
            }
            parsed
        })
        .collect())
}

/// Sort key for `Transaction ID`: integer ids numerically, then any other text, missing last.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum IdKey<'a> {
    Number(i64),
    Text(&'a str),
    Missing,
}

impl<'a> IdKey<'a> {
    fn new(raw: Option<&'a str>) -> Self {
        match raw {
            None => IdKey::Missing,
            Some(s) => match s.trim().parse::<i64>() {
                Ok(n) => IdKey::Number(n),
                Err(_) => IdKey::Text(s),
            },
        }
    }
}

/// Stable sort by `(date, transaction id)`; `dates` is aligned with `batch` rows.
fn sort_rows(batch: &RecordBatch, dates: &[NaiveDate]) -> Result<RecordBatch> {
    let ids = string_column(batch, TRANSACTION_ID)?;
    let keys: Vec<IdKey<'_>> = (0..ids.len())
        .map(|i| IdKey::new((!ids.is_null(i)).then(|| ids.value(i))))
        .collect();

    let mut order: Vec<u32> = (0..batch.num_rows() as u32).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (a as usize, b as usize);
        match dates[a].cmp(&dates[b]) {
            Ordering::Equal => keys[a].cmp(&keys[b]),
            other => other,
        }
    });

    let indices = UInt32Array::from(order);
    let columns = batch
        .columns()
        .iter()
        .map(|c| take(c.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}
