use std::sync::mpsc;
use std::thread::JoinHandle;

use super::{ExportArtifact, ExportError, ExportFormat, ExportResult, Exporter};
use crate::grid::PixelGrid;

/// Runs `work` on a worker thread and delivers its result to `on_result`
/// from a second thread once it arrives.
///
/// `on_result` receives `None` when the worker dies before sending.
pub(crate) fn spawn_worker_action<T, W, H>(work: W, on_result: H) -> JoinHandle<()>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    H: FnOnce(Option<T>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });

    std::thread::spawn(move || on_result(rx.recv().ok()))
}

/// Encodes `grid` off the caller's thread and hands the artifact (or the
/// failure) to `on_complete`.
///
/// The grid is moved in as a snapshot, so later edits never leak into a
/// pending export. Every call is independent: two pending exports of the
/// same format both complete and both report.
pub fn spawn_export<F>(
    exporter: Exporter,
    grid: PixelGrid,
    format: ExportFormat,
    on_complete: F,
) -> JoinHandle<()>
where
    F: FnOnce(ExportResult<ExportArtifact>) + Send + 'static,
{
    tracing::debug!(%format, revision = grid.revision(), "background export queued");
    spawn_worker_action(
        move || exporter.export(&grid, format),
        move |result| {
            let result = result.unwrap_or(Err(ExportError::WorkerDisconnected));
            if let Err(err) = &result {
                tracing::warn!(%format, %err, "background export failed");
            }
            on_complete(result);
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::export::{ExportSettings, PdfDocumentEncoder};
    use std::sync::{Arc, Mutex};

    fn grid_with(color: Color) -> PixelGrid {
        let mut grid = PixelGrid::square(2).expect("positive dimensions");
        grid.set_cell(0, 0, Some(color)).expect("cell in range");
        grid
    }

    fn pdf_exporter() -> Exporter {
        Exporter::new(ExportSettings {
            cell_pixel_size: 4,
            high_resolution_scale: 1,
        })
        .with_document_encoder(Arc::new(PdfDocumentEncoder::default()))
    }

    #[test]
    fn completion_callback_receives_the_artifact() {
        let received = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&received);
        spawn_export(
            pdf_exporter(),
            grid_with(Color::new(0xFF, 0, 0)),
            ExportFormat::Pdf,
            move |result| {
                *sink.lock().expect("result lock") = Some(result);
            },
        )
        .join()
        .expect("delivery thread should finish");

        let artifact = received
            .lock()
            .expect("result lock")
            .take()
            .expect("callback should have run")
            .expect("pdf export should succeed");
        assert_eq!(artifact.format, ExportFormat::Pdf);
        assert!(artifact.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn missing_encoder_is_reported_through_the_callback() {
        let (tx, rx) = mpsc::channel();
        spawn_export(
            Exporter::new(ExportSettings::default()),
            grid_with(Color::BLACK),
            ExportFormat::Pdf,
            move |result| {
                let _ = tx.send(result);
            },
        )
        .join()
        .expect("delivery thread should finish");

        assert!(matches!(
            rx.recv().expect("callback should have run"),
            Err(ExportError::EncoderUnavailable {
                format: ExportFormat::Pdf
            })
        ));
    }

    #[test]
    fn concurrent_exports_complete_independently() {
        let (tx, rx) = mpsc::channel();
        let handles = [Color::new(0xFF, 0, 0), Color::new(0, 0, 0xFF)]
            .into_iter()
            .map(|color| {
                let tx = tx.clone();
                spawn_export(pdf_exporter(), grid_with(color), ExportFormat::Pdf, move |result| {
                    let _ = tx.send(result.map(|artifact| artifact.bytes));
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("delivery thread should finish");
        }
        drop(tx);

        let outputs = rx
            .iter()
            .map(|result| result.expect("pdf export should succeed"))
            .collect::<Vec<_>>();
        assert_eq!(outputs.len(), 2);
        assert_ne!(outputs[0], outputs[1]);
    }

    #[test]
    fn panicking_worker_reports_none() {
        let (tx, rx) = mpsc::channel();
        spawn_worker_action(
            || -> u8 { panic!("worker failure") },
            move |result| {
                let _ = tx.send(result);
            },
        )
        .join()
        .expect("delivery thread should finish");
        assert_eq!(rx.recv().expect("callback should have run"), None);
    }
}
