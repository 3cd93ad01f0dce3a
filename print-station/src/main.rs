use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use pos_printer::{PrintDispatcher, SystemSpooler, resolve_printer};
use print_station::{PrintStation, dump_sale, load_sale, setup_environment};

/// Print finalized sales, one receipt slip per line item
#[derive(Parser, Debug)]
#[command(name = "print-station", version, about)]
struct Cli {
    /// Sale records (JSON) to print
    #[arg(required = true)]
    sales: Vec<PathBuf>,

    /// Target printer (overrides PRINTER_NAME; default: system default printer)
    #[arg(short, long)]
    printer: Option<String>,

    /// Write the receipt bytes to this directory instead of printing
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let (config, _log_guard) = setup_environment();
    let cli = Cli::parse();

    // 2. 读取销售记录
    let mut sales = Vec::with_capacity(cli.sales.len());
    for path in &cli.sales {
        sales.push(load_sale(path).await?);
    }

    let renderer = config.renderer();
    if let Some(dir) = &cli.dump {
        for sale in &sales {
            dump_sale(&renderer, sale, dir).await?;
        }
        return Ok(());
    }

    // 3. 启动打印队列
    let printer = resolve_printer(cli.printer.as_deref().or(config.printer_name.as_deref())).await;
    let spooler = Arc::new(SystemSpooler::new(config.spooler_config()));
    let dispatcher = Arc::new(PrintDispatcher::new(spooler, renderer));
    let station = PrintStation::new(dispatcher, printer);

    tracing::info!(printer = %station.printer_name(), sales = sales.len(), "Printing");

    // 4. 打印并逐项报告失败
    let reports = station.print_all(&sales).await;
    let mut failed = 0;
    for report in &reports {
        for line in report.failures() {
            failed += 1;
            if let Err(e) = &line.result {
                tracing::error!(
                    sale_id = report.sale_id,
                    line = line.index + 1,
                    product = %line.product_name,
                    error = %e,
                    "Item receipt not printed"
                );
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} item receipt(s) failed to print", failed);
    }

    tracing::info!("All receipts printed");
    Ok(())
}
