use trivet_core::{DataSource, Error, Result};
use trivet_sql::Dialect;

use std::sync::Arc;
use url::Url;

/// Builds the data source and matching dialect for a connection URL.
///
/// The scheme selects the driver; each driver ships behind a feature flag of
/// the same name.
pub(crate) fn data_source(url: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
    let parsed = Url::parse(url).map_err(Error::driver)?;

    match parsed.scheme() {
        "sqlite" => connect_sqlite(url),
        "postgresql" | "postgres" => connect_postgresql(url),
        scheme => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
    let source = trivet_driver_sqlite::Sqlite::new(url)?;
    Ok((Arc::new(source), Dialect::sqlite()))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
    Err(trivet_core::err!("`sqlite` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(url: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
    let source = trivet_driver_postgresql::PostgreSQL::new(url)?;
    Ok((Arc::new(source), Dialect::postgresql()))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_url: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
    Err(trivet_core::err!("`postgresql` feature not enabled"))
}
