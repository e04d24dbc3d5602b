use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Splits a VCF-like line into its leading CHROM field without allocating
/// the rest of the line.
fn chrom_of(line: &str) -> &str {
    line.split('\t').next().unwrap_or("")
}

/// Cooperative stop signal shared between a [`LineReader`] and its caller.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Spawns a reader thread that pulls lines from `source` and publishes
/// them as chromosome-bound batches on a single-slot bounded queue.
///
/// A batch ends whenever a line's CHROM differs from the batch's first
/// line, so the consumer always sees whole chromosomes per batch (modulo
/// an oversized final partial chromosome at EOF). The reader pushes one
/// empty batch as a sentinel after EOF, then exits. `stop` lets the caller
/// request early termination; the reader checks it once per batch
/// boundary and, on a requested stop, drains nothing further and exits
/// after its current push completes.
pub fn spawn_line_reader<R>(mut source: R, stop: StopFlag) -> (Receiver<Vec<String>>, JoinHandle<std::io::Result<()>>)
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = sync_channel::<Vec<String>>(1);
    let handle = std::thread::spawn(move || -> std::io::Result<()> {
        let mut batch: Vec<String> = Vec::new();
        let mut batch_chrom: Option<String> = None;

        loop {
            if stop.is_stopped() {
                break;
            }
            let mut line = String::new();
            let bytes = source.read_line(&mut line)?;
            if bytes == 0 {
                if !batch.is_empty() && tx.send(std::mem::take(&mut batch)).is_err() {
                    break;
                }
                let _ = tx.send(Vec::new());
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
            let chrom = chrom_of(&trimmed).to_string();
            match &batch_chrom {
                Some(current) if *current != chrom => {
                    if tx.send(std::mem::take(&mut batch)).is_err() {
                        break;
                    }
                    batch_chrom = Some(chrom);
                    batch.push(trimmed);
                }
                Some(_) => batch.push(trimmed),
                None => {
                    batch_chrom = Some(chrom);
                    batch.push(trimmed);
                }
            }
        }
        Ok(())
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn partitions_batches_on_chromosome_change() {
        let data = "1\t100\n1\t150\n1\t200\n1\t250\n2\t50\n2\t60\n";
        let (rx, handle) = spawn_line_reader(Cursor::new(data), StopFlag::new());
        let first = rx.recv().unwrap();
        assert_eq!(first.len(), 4);
        assert!(first[0].starts_with('1'));

        let second = rx.recv().unwrap();
        assert_eq!(second.len(), 2);
        assert!(second[0].starts_with('2'));

        let sentinel = rx.recv().unwrap();
        assert!(sentinel.is_empty());
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn stop_flag_halts_the_reader() {
        let stop = StopFlag::new();
        stop.request_stop();
        let (rx, handle) = spawn_line_reader(Cursor::new("1\t100\n"), stop);
        // The reader may or may not have pushed a partial batch before
        // observing the stop flag; either way it must terminate promptly.
        let _ = rx.try_recv();
        handle.join().unwrap().unwrap();
    }
}
