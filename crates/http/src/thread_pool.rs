use std::sync::OnceLock;
use std::thread;

use crossbeam_channel as channel;

type Job = Box<dyn FnOnce() + Send + 'static>;

static SENDER: OnceLock<channel::Sender<Job>> = OnceLock::new();

fn init() -> channel::Sender<Job> {
    // Bounded queue for backpressure; capacity proportional to cores.
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let capacity = (workers * 256).max(64);
    let (tx, rx) = channel::bounded::<Job>(capacity);
    for index in 0..workers {
        let rx = rx.clone();
        thread::Builder::new()
            .name(format!("burrow-worker-{}", index))
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            })
            .ok();
    }
    tx
}

/// Queues a request job; fails when the queue is full.
pub(crate) fn submit(job: Job) -> Result<(), channel::TrySendError<Job>> {
    SENDER.get_or_init(init).try_send(job)
}
