//! # pos-printer
//!
//! Receipt printing for the till: ESC/POS rendering plus a print queue that
//! talks to the OS spooler.
//!
//! ## Scope
//!
//! - ESC/POS command building
//! - Text sanitation and Windows-1252 encoding for single-byte printers
//! - Sale receipt rendering (one slip per line item, or whole sale)
//! - Raw spooler submission (`lpr -o raw`, or a Windows printer share)
//! - A dispatcher that runs print jobs strictly one at a time, in order
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pos_printer::{PrintDispatcher, ReceiptRenderer, SpoolerConfig, SystemSpooler};
//!
//! let spooler = Arc::new(SystemSpooler::new(SpoolerConfig::default()));
//! let dispatcher = PrintDispatcher::new(spooler, ReceiptRenderer::default());
//!
//! let report = dispatcher.print_sale("EPSON_TM_T20", &sale).await;
//! for failed in report.failures() {
//!     eprintln!("{}: {:?}", failed.product_name, failed.result);
//! }
//! ```

mod dispatcher;
mod encoding;
mod error;
mod escpos;
mod receipt;
mod spooler;

// Re-exports
pub use dispatcher::{
    DispatcherState, LinePrintOutcome, PrintDispatcher, PrintHandle, SalePrintReport,
};
pub use encoding::{ELLIPSIS, encode_cp1252, pad_text, sanitize_text, text_width, truncate_with_ellipsis};
pub use error::{PrintError, PrintResult};
pub use escpos::{Align, CODE_PAGE_WPC1252, EscPosBuilder};
pub use receipt::{DEFAULT_WIDTH, ReceiptRenderer};
pub use spooler::{
    DEFAULT_PRINTER_NAME, RawSpooler, SpoolerConfig, SystemSpooler, default_printer,
    resolve_printer,
};
