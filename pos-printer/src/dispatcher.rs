//! Print job dispatcher
//!
//! Serializes print jobs against the OS spooler. Any number of callers may
//! submit concurrently; one worker task sends the jobs one at a time, in
//! submission order, and reports each outcome to its own caller only.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use shared::models::Sale;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::receipt::ReceiptRenderer;
use crate::spooler::RawSpooler;

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// No job in flight
    Idle,
    /// Exactly one job in flight
    Draining,
}

/// One queued print request
struct PrintJob {
    id: u64,
    printer_name: String,
    payload: Vec<u8>,
    done: oneshot::Sender<PrintResult<()>>,
}

/// Pending outcome of a submitted job
///
/// Resolves once the job has been sent (or has failed). Resolves to
/// [`PrintError::Abandoned`] if the dispatcher stops first.
#[derive(Debug)]
pub struct PrintHandle {
    job_id: u64,
    rx: oneshot::Receiver<PrintResult<()>>,
}

impl PrintHandle {
    pub fn job_id(&self) -> u64 {
        self.job_id
    }
}

impl Future for PrintHandle {
    type Output = PrintResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Err(PrintError::Abandoned)))
    }
}

/// Outcome of one line receipt
#[derive(Debug)]
pub struct LinePrintOutcome {
    /// Position of the line in the sale
    pub index: usize,
    pub product_name: String,
    pub result: PrintResult<()>,
}

/// Per-line outcomes of [`PrintDispatcher::print_sale`]
///
/// Partial failure is a normal outcome: printed slips stay printed.
#[derive(Debug)]
pub struct SalePrintReport {
    pub sale_id: i64,
    pub lines: Vec<LinePrintOutcome>,
}

impl SalePrintReport {
    pub fn is_success(&self) -> bool {
        self.lines.iter().all(|line| line.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinePrintOutcome> {
        self.lines.iter().filter(|line| line.result.is_err())
    }
}

#[derive(Debug, Default)]
struct DispatcherStatus {
    in_flight: AtomicBool,
    queued: AtomicUsize,
}

/// Print dispatcher
///
/// Owns the print queue and its worker task. Construct one per process and
/// share it (e.g. behind an `Arc`) with whatever needs to print. Must be
/// created inside a Tokio runtime.
pub struct PrintDispatcher {
    tx: mpsc::UnboundedSender<PrintJob>,
    renderer: ReceiptRenderer,
    status: Arc<DispatcherStatus>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

impl PrintDispatcher {
    /// Create a dispatcher and start its worker
    pub fn new(spooler: Arc<dyn RawSpooler>, renderer: ReceiptRenderer) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(DispatcherStatus::default());
        let shutdown = CancellationToken::new();

        let worker = PrintWorker {
            spooler,
            status: status.clone(),
        };
        tokio::spawn(worker.run(rx, shutdown.clone()));

        Self {
            tx,
            renderer,
            status,
            next_id: AtomicU64::new(1),
            shutdown,
        }
    }

    /// Queue a raw payload for the named printer
    ///
    /// Never fails: errors arrive through the returned handle.
    pub fn submit(&self, printer_name: impl Into<String>, payload: Vec<u8>) -> PrintHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (done, rx) = oneshot::channel();
        let job = PrintJob {
            id,
            printer_name: printer_name.into(),
            payload,
            done,
        };

        debug!(
            job_id = id,
            printer = %job.printer_name,
            bytes = job.payload.len(),
            "Print job queued"
        );

        self.status.queued.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            self.status.queued.fetch_sub(1, Ordering::SeqCst);
            warn!(job_id = id, "Print worker stopped, job abandoned");
            let _ = job.done.send(Err(PrintError::Abandoned));
        }

        PrintHandle { job_id: id, rx }
    }

    /// Print a sale as one slip per line item
    ///
    /// Each line is rendered on its own receipt and submitted only after the
    /// previous one has settled. A failed line does not stop the rest.
    #[instrument(skip(self, sale), fields(sale_id = sale.id, lines = sale.items.len()))]
    pub async fn print_sale(&self, printer_name: &str, sale: &Sale) -> SalePrintReport {
        info!(printer = %printer_name, "Printing sale");

        let mut lines = Vec::with_capacity(sale.items.len());
        for (index, line) in sale.items.iter().enumerate() {
            let payload = self.renderer.render_line(sale, line);
            let result = self.submit(printer_name, payload).await;

            if let Err(e) = &result {
                warn!(
                    line = index,
                    product = %line.product.name,
                    error = %e,
                    "Line receipt failed"
                );
            }

            lines.push(LinePrintOutcome {
                index,
                product_name: line.product.name.clone(),
                result,
            });
        }

        SalePrintReport {
            sale_id: sale.id,
            lines,
        }
    }

    pub fn state(&self) -> DispatcherState {
        if self.status.in_flight.load(Ordering::SeqCst) {
            DispatcherState::Draining
        } else {
            DispatcherState::Idle
        }
    }

    /// Jobs waiting behind the one in flight
    pub fn queued(&self) -> usize {
        self.status.queued.load(Ordering::SeqCst)
    }

    pub fn renderer(&self) -> &ReceiptRenderer {
        &self.renderer
    }

    /// Stop the worker
    ///
    /// The job in flight still completes; queued jobs are abandoned.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Single consumer of the print queue
struct PrintWorker {
    spooler: Arc<dyn RawSpooler>,
    status: Arc<DispatcherStatus>,
}

impl PrintWorker {
    /// Run the worker (until shutdown or until every sender is gone)
    async fn run(self, mut rx: mpsc::UnboundedReceiver<PrintJob>, shutdown: CancellationToken) {
        info!("Print worker started");

        loop {
            let job = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Print worker received shutdown signal");
                    break;
                }
                job = rx.recv() => {
                    let Some(job) = job else {
                        info!("Print queue closed, worker stopping");
                        break;
                    };
                    job
                }
            };

            self.status.queued.fetch_sub(1, Ordering::SeqCst);
            self.status.in_flight.store(true, Ordering::SeqCst);

            let result = self.execute(&job).await;

            self.status.in_flight.store(false, Ordering::SeqCst);
            if job.done.send(result).is_err() {
                debug!(job_id = job.id, "Print handle dropped before completion");
            }
        }

        rx.close();
        let mut abandoned = 0;
        while let Ok(job) = rx.try_recv() {
            self.status.queued.fetch_sub(1, Ordering::SeqCst);
            let _ = job.done.send(Err(PrintError::Abandoned));
            abandoned += 1;
        }
        if abandoned > 0 {
            warn!(abandoned, "Queued print jobs abandoned");
        }
    }

    #[instrument(skip_all, fields(job_id = job.id, printer = %job.printer_name, bytes = job.payload.len()))]
    async fn execute(&self, job: &PrintJob) -> PrintResult<()> {
        info!("Print job started");

        let result = self.spooler.print_raw(&job.printer_name, &job.payload).await;
        match &result {
            Ok(()) => info!("Print job finished"),
            Err(e) => error!(error = %e, "Print job failed"),
        }
        result
    }
}
