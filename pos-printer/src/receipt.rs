//! Sale receipt renderer
//!
//! Renders a sale (or a subset of its lines) into ESC/POS bytes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared::models::{Sale, SaleLine};

use crate::encoding::{pad_text, sanitize_text, truncate_with_ellipsis};
use crate::escpos::{Align, CODE_PAGE_WPC1252, EscPosBuilder};

/// Default receipt width in columns (80mm paper, condensed font)
pub const DEFAULT_WIDTH: usize = 80;

/// Columns reserved for the quantity, e.g. `"12x "`
const QTY_WIDTH: usize = 4;

/// Separator columns around the name field
const PADDING: usize = 4;

/// Lines fed before the cut
const FEED_LINES: u8 = 5;

const FOOTER_TEXT: &str = "Obrigado pela compra!";

/// Sale receipt renderer
///
/// Pure: the same sale and line selection always produce the same bytes.
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    width: usize,
    timezone: Tz,
}

impl ReceiptRenderer {
    /// Create a renderer with the given width in columns and display timezone
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns left for the product name
    pub fn name_width(&self) -> usize {
        self.width.saturating_sub(QTY_WIDTH + PADDING)
    }

    /// Render a receipt with every line of the sale
    pub fn render(&self, sale: &Sale) -> Vec<u8> {
        self.render_lines(sale, &sale.items)
    }

    /// Render a receipt holding a single line of the sale
    pub fn render_line(&self, sale: &Sale, line: &SaleLine) -> Vec<u8> {
        self.render_lines(sale, std::iter::once(line))
    }

    /// Render a receipt with an explicit selection of lines, in the given order
    pub fn render_lines<'a>(
        &self,
        sale: &Sale,
        lines: impl IntoIterator<Item = &'a SaleLine>,
    ) -> Vec<u8> {
        let mut b = EscPosBuilder::new();

        self.render_header(&mut b, sale);

        for line in lines {
            b.line(&self.format_item_line(line.quantity, &line.product.name));
        }

        self.render_footer(&mut b);

        b.build()
    }

    /// Format one item line (without the trailing line feed)
    ///
    /// `"{q}x"` padded to the quantity column, a space, the sanitized name
    /// padded to `name_width`, a space.
    pub fn format_item_line(&self, quantity: u32, name: &str) -> String {
        // Quantities wider than the column push the name right, never cut
        let qty = format!("{:<width$}", format!("{}x", quantity), width = QTY_WIDTH);
        let name_width = self.name_width();
        let name = truncate_with_ellipsis(&sanitize_text(name), name_width);

        format!("{} {} ", qty, pad_text(&name, name_width, false))
    }

    /// Render the header section
    fn render_header(&self, b: &mut EscPosBuilder, sale: &Sale) {
        b.code_page(CODE_PAGE_WPC1252)
            .align(Align::Center)
            .bold(true)
            .double_height(true);

        b.line(&format!("Pedido: {}", sale.id));
        b.line(&format!("Data: {}", format_timestamp(sale.created_at, self.timezone)));

        let client = sale.client_name.trim();
        if !client.is_empty() {
            b.line(&format!("Cliente: {}", client));
        }
        b.line(&format!("Pagamento: {}", sale.payment_method.label()));

        b.double_height(false)
            .bold(false)
            .newline()
            .align(Align::Left);
    }

    /// Render the footer: thank-you line, feed, cut, reset
    fn render_footer(&self, b: &mut EscPosBuilder) {
        b.line(FOOTER_TEXT).feed(FEED_LINES).cut().init();
    }
}

impl Default for ReceiptRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, Tz::UTC)
    }
}

/// Format a timestamp as `dd/mm/yyyy - HH:MM:SS` in the given timezone
fn format_timestamp(ts: DateTime<Utc>, tz: Tz) -> String {
    let local = ts.with_timezone(&tz);
    format!("{} - {}", local.format("%d/%m/%Y"), local.format("%H:%M:%S"))
}
