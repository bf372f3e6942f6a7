use tracing::debug;

use crate::error::{EtlError, Result};

pub const TRANSACTION_ID: &str = "Transaction ID";
pub const DATE: &str = "Date";
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const MONTH_NAME: &str = "MonthName";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const AGE_BAND: &str = "Age Band";
pub const PRODUCT_CATEGORY: &str = "Product Category";
pub const QUANTITY: &str = "Quantity";
pub const PRICE_PER_UNIT: &str = "Price per Unit";
pub const TOTAL_AMOUNT: &str = "Total Amount";

/// Columns the raw source must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    TRANSACTION_ID,
    DATE,
    CUSTOMER_ID,
    GENDER,
    AGE,
    PRODUCT_CATEGORY,
    QUANTITY,
    PRICE_PER_UNIT,
    TOTAL_AMOUNT,
];

/// Output header order; passthrough columns follow.
pub const CANONICAL_COLUMNS: [&str; 13] = [
    TRANSACTION_ID,
    DATE,
    YEAR,
    MONTH,
    MONTH_NAME,
    CUSTOMER_ID,
    GENDER,
    AGE,
    AGE_BAND,
    PRODUCT_CATEGORY,
    QUANTITY,
    PRICE_PER_UNIT,
    TOTAL_AMOUNT,
];

/// Required columns absent from `headers`, in `REQUIRED_COLUMNS` order.
/// Headers are compared after trimming; the match is case-sensitive.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !headers.iter().any(|h| h.as_ref().trim() == **req))
        .map(|req| req.to_string())
        .collect()
}

pub fn validate_columns<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    let missing = missing_columns(headers);
    if !missing.is_empty() {
        return Err(EtlError::Schema { missing });
    }
    debug!(columns = headers.len(), "schema ok");
    Ok(())
}
