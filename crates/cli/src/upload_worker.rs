use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use vidscribe_core::intake::intake_use_case::IntakeUseCase;
use vidscribe_core::intake::upload_request::UploadRequest;

use crate::report::UploadReport;

/// Where an upload's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    File(PathBuf),
    Stdin { declared_name: String },
}

impl UploadSource {
    pub fn label(&self) -> String {
        match self {
            UploadSource::File(path) => path.display().to_string(),
            UploadSource::Stdin { .. } => "-".to_string(),
        }
    }

    fn open(&self) -> io::Result<UploadRequest> {
        match self {
            UploadSource::File(path) => {
                let declared = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(UploadRequest::new(declared, File::open(path)?))
            }
            UploadSource::Stdin { declared_name } => {
                Ok(UploadRequest::new(declared_name.clone(), io::stdin()))
            }
        }
    }
}

/// Runs every upload on a pool of `jobs` threads. Reports come back in input
/// order.
pub fn run_uploads(
    use_case: Arc<IntakeUseCase>,
    sources: Vec<UploadSource>,
    jobs: usize,
) -> Vec<UploadReport> {
    let total = sources.len();
    let workers = jobs.clamp(1, total.max(1));
    let labels: Vec<String> = sources.iter().map(UploadSource::label).collect();
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, UploadSource)>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, UploadReport)>();

    for job in sources.into_iter().enumerate() {
        // Receiver is alive until the workers below exit.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let use_case = use_case.clone();
            thread::spawn(move || {
                for (index, source) in job_rx.iter() {
                    let report = upload_one(&use_case, &source);
                    if result_tx.send((index, report)).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    drop(result_tx);

    let mut slots: Vec<Option<UploadReport>> = vec![None; total];
    for (index, report) in result_rx.iter() {
        slots[index] = Some(report);
    }
    for handle in handles {
        if handle.join().is_err() {
            log::error!("Upload worker panicked");
        }
    }

    // Jobs taken by a panicking worker, or left queued after every worker
    // died, never report; they still get a failed line.
    let reported = slots.iter().filter(|slot| slot.is_some()).count();
    log::debug!("{reported} of {total} uploads reported");
    slots
        .into_iter()
        .zip(labels)
        .map(|(slot, label)| slot.unwrap_or_else(|| UploadReport::lost(label)))
        .collect()
}

fn upload_one(use_case: &IntakeUseCase, source: &UploadSource) -> UploadReport {
    let label = source.label();
    match source.open() {
        Ok(request) => UploadReport::from_outcome(label, &use_case.handle(request)),
        Err(e) => {
            log::warn!("Cannot open {label}: {e}");
            UploadReport::unreadable(label, &e)
        }
    }
}
