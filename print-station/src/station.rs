//! Print station
//!
//! Loads finalized sales and hands them to the shared print dispatcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use pos_printer::{PrintDispatcher, ReceiptRenderer, SalePrintReport};
use shared::models::Sale;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum StationError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid sale record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StationResult<T> = Result<T, StationError>;

/// Print station bound to one printer
#[derive(Clone)]
pub struct PrintStation {
    dispatcher: Arc<PrintDispatcher>,
    printer_name: String,
}

impl PrintStation {
    pub fn new(dispatcher: Arc<PrintDispatcher>, printer_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            printer_name: printer_name.into(),
        }
    }

    pub fn printer_name(&self) -> &str {
        &self.printer_name
    }

    /// Print one sale, one slip per line item
    pub async fn print_sale(&self, sale: &Sale) -> SalePrintReport {
        self.dispatcher.print_sale(&self.printer_name, sale).await
    }

    /// Print several sales concurrently
    ///
    /// Each sale keeps its own line order; the dispatcher interleaves the
    /// sales' jobs in submission order and never runs two at once.
    pub async fn print_all(&self, sales: &[Sale]) -> Vec<SalePrintReport> {
        join_all(sales.iter().map(|sale| self.print_sale(sale))).await
    }
}

/// Read a sale record from a JSON file
pub async fn load_sale(path: &Path) -> StationResult<Sale> {
    let bytes = tokio::fs::read(path).await.map_err(|source| StationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| StationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the per-line receipts of a sale to `dir` instead of printing them
///
/// Files are named `sale-{id}-line-{n}.bin`, one per line item.
#[instrument(skip(renderer, sale), fields(sale_id = sale.id))]
pub async fn dump_sale(
    renderer: &ReceiptRenderer,
    sale: &Sale,
    dir: &Path,
) -> StationResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StationError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut written = Vec::with_capacity(sale.items.len());
    for (index, line) in sale.items.iter().enumerate() {
        let path = dir.join(format!("sale-{}-line-{}.bin", sale.id, index + 1));
        let data = renderer.render_line(sale, line);

        tokio::fs::write(&path, &data)
            .await
            .map_err(|source| StationError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), bytes = data.len(), "Receipt written");
        written.push(path);
    }

    Ok(written)
}
