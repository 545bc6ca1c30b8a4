//! Batch rendering: one personalized invite per guest record, across a
//! bounded worker pool.

use crate::catalog::{BackgroundRef, FormatId};
use crate::compositor::Compositor;
use crate::data::{DataSource, GuestRecord, Predicate};
use crate::error::{Error, Result};
use crate::image::ImgBackend;
use crate::layout::{Offsets, Pan, TextBlock, TextField};
use crate::logs::{LogEvent, ProgressBar};
use crate::text::FontMap;

use std::collections::VecDeque;
use std::num::NonZero;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{mpsc, Arc, Condvar, Mutex, RwLock};
use std::thread::{self, JoinHandle};

/// The invite every guest receives, minus the personalized greeting.
#[derive(Debug, Clone)]
pub struct InviteSpec {
    pub event_name: String,
    pub event_details: String,
    pub background: BackgroundRef,
    pub format: FormatId,
    pub offsets: Offsets,
    pub pan: Pan,
}

impl InviteSpec {
    /// Pushes the shared fields into a compositor. The background selection
    /// zeroes the pan, so the pan lands last.
    pub fn configure(&self, compositor: &mut Compositor) {
        compositor.set_format(self.format);
        compositor.set_text(TextField::EventName, &self.event_name);
        compositor.set_text(TextField::EventDetails, &self.event_details);
        compositor.set_offset(TextBlock::Greeting, self.offsets.greeting);
        compositor.set_offset(TextBlock::Headline, self.offsets.headline);
        compositor.set_offset(TextBlock::Details, self.offsets.details);
        compositor.select_background(self.background.clone());
        compositor.set_pan(self.pan);
    }
}

macro_rules! send {
    ($Variant:ident(from $id:expr) to $tx:expr) => {
        $tx.send(LogEvent::$Variant($id)).map_err(|e| Error::send($id, e))
    };
    ($Variant:ident(from $id:expr, $v:expr) to $tx:expr) => {
        $tx.send(LogEvent::$Variant($id, $v)).map_err(|e| Error::send($id, e))
    };
    ($Variant:ident($v:expr) to $tx:expr) => {
        $tx.send(LogEvent::$Variant($v)).map_err(|e| Error::send(0, e))
    };
}

macro_rules! lock {
    (read $T:literal $lock:expr) => {
        $lock.read().map_err(|e| Error::read_lock($T, e))?
    };
    ($T:literal $lock:expr) => {
        $lock.lock().map_err(|e| Error::mutex_lock($T, e))?
    };
}

pub struct Pipeline {
    n_workers: usize,
    source: Box<dyn DataSource>,
    spec: InviteSpec,
    font_map: FontMap,
    img_backend: ImgBackend,
    assets_dir: Option<PathBuf>,
    out_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        n_workers: NonZero<usize>,
        source: Box<dyn DataSource>,
        spec: InviteSpec,
        font_map: FontMap,
        assets_dir: Option<PathBuf>,
        out_dir: PathBuf,
    ) -> Result<Self> {
        let av_workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let n_workers = n_workers.get().clamp(1, av_workers);
        Ok(Self {
            n_workers,
            source,
            spec,
            font_map,
            img_backend: ImgBackend::new()?,
            assets_dir,
            out_dir,
        })
    }

    pub fn run(mut self, filter: Option<Predicate>) -> Result<()> {
        let n_workers = self.n_workers;
        let queue = Arc::new(GuestQueue::new(n_workers * 2));
        let img_backend = Arc::new(RwLock::new(self.img_backend));
        let font_map = Arc::new(RwLock::new(self.font_map));
        let spec = Arc::new(self.spec);
        let assets_dir = Arc::new(self.assets_dir);
        let out_dir = Arc::new(self.out_dir);
        let (tx, rx) = mpsc::channel();

        let handles: Vec<JoinHandle<Result<()>>> = (1..=n_workers)
            .map(|id| {
                let tx = tx.clone();
                let queue = queue.clone();
                let img_backend = img_backend.clone();
                let font_map = font_map.clone();
                let spec = spec.clone();
                let assets_dir = assets_dir.clone();
                let out_dir = out_dir.clone();

                thread::spawn(move || {
                    let img_backend = lock!(read "ImgBackend" img_backend);
                    let font_map = lock!(read "FontMap" font_map);
                    let mut compositor = Compositor::new(&img_backend, &font_map);
                    compositor.set_assets_dir(assets_dir.as_ref().clone());
                    spec.configure(&mut compositor);
                    compositor.load_background()?;
                    let worker = Worker {
                        id,
                        tx,
                        queue,
                        compositor,
                        out_dir,
                    };
                    worker.run()
                })
            })
            .collect();

        thread::spawn(move || {
            let mut pbar = ProgressBar::new_stderr(NonZero::new(n_workers).unwrap()).unwrap();
            loop {
                if let Ok(log) = rx.try_recv() {
                    pbar.log(log).unwrap();
                }
                pbar.update().unwrap();
            }
        });

        let mut total: usize = 0;
        for guest in self.source.read(filter)? {
            total += 1;
            match guest {
                Ok(guest) => queue.push(guest)?,
                Err(e) => send!(Warn(from 0, e.to_string()) to tx)?,
            }
        }
        queue.done()?;
        send!(Total(total) to tx)?;

        for (id, handle) in handles.into_iter().enumerate() {
            let thread_result = handle.join().map_err(|_| Error::JoinError(id + 1))?;
            if let Err(e) = thread_result {
                send!(Error(from id + 1, e.to_string()) to tx)?;
            }
        }
        send!(Done(from 0, "done!".into()) to tx)?;
        Ok(())
    }
}

/// Bounded handoff between the reader and the workers. `push` blocks when
/// full, `pop` blocks when empty and returns `None` once drained after
/// `done`.
struct GuestQueue {
    state: Mutex<GuestQueueState>,
    capacity: usize,
    cond: Condvar,
}

struct GuestQueueState {
    queue: VecDeque<GuestRecord>,
    done: bool,
}

impl GuestQueue {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(GuestQueueState {
                queue: VecDeque::with_capacity(capacity),
                done: false,
            }),
            capacity,
            cond: Condvar::new(),
        }
    }

    fn push(&self, guest: GuestRecord) -> Result<()> {
        let state = lock!("GuestQueue" self.state);
        let mut state = self
            .cond
            .wait_while(state, |s| s.queue.len() >= self.capacity)
            .map_err(|e| Error::mutex_lock("GuestQueue", e))?;
        state.queue.push_back(guest);
        self.cond.notify_one();
        Ok(())
    }

    fn pop(&self) -> Result<Option<GuestRecord>> {
        let state = lock!("GuestQueue" self.state);
        let mut state = self
            .cond
            .wait_while(state, |s| s.queue.is_empty() && !s.done)
            .map_err(|e| Error::mutex_lock("GuestQueue", e))?;
        let guest = state.queue.pop_front();
        self.cond.notify_all();
        Ok(guest)
    }

    fn done(&self) -> Result<()> {
        let mut state = lock!("GuestQueue" self.state);
        state.done = true;
        self.cond.notify_all();
        Ok(())
    }
}

struct Worker<'a> {
    id: usize,
    tx: Sender<LogEvent>,
    queue: Arc<GuestQueue>,
    compositor: Compositor<'a>,
    out_dir: Arc<PathBuf>,
}

impl Worker<'_> {
    fn run(mut self) -> Result<()> {
        while let Some(guest) = self.queue.pop()? {
            let name = guest.name();
            send!(Status(from self.id, format!("rendering invite for `{name}`...")) to self.tx)?;
            match self.process(guest) {
                Ok(()) => send!(Count(from self.id) to self.tx)?,
                Err(e) => send!(Warn(from self.id, e.to_string()) to self.tx)?,
            }
        }
        send!(Done(from self.id, "done!".to_string()) to self.tx)?;
        Ok(())
    }

    fn process(&mut self, guest: GuestRecord) -> Result<()> {
        self.compositor
            .set_text(TextField::FriendName, guest.name());
        self.compositor.refresh()?;
        self.compositor.export_to(&self.out_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use std::sync::Arc;
    use std::thread;

    fn guest(name: &str) -> GuestRecord {
        GuestRecord(
            [(
                GuestRecord::NAME_FIELD.to_string(),
                crate::data::Value::from(name),
            )]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn queue_drains_in_order_and_ends_after_done() {
        let queue = Arc::new(GuestQueue::new(2));
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                let mut names = Vec::new();
                while let Some(g) = queue.pop().unwrap() {
                    names.push(g.name());
                }
                names
            })
        };
        for name in ["Ana", "Mark", "Jo", "Sam", "Lee"] {
            queue.push(guest(name)).unwrap();
        }
        queue.done().unwrap();
        let names = consumer.join().unwrap();
        assert_eq!(names, vec!["Ana", "Mark", "Jo", "Sam", "Lee"]);
    }

    #[test]
    fn pop_after_done_returns_none() {
        let queue = GuestQueue::new(2);
        queue.done().unwrap();
        assert!(queue.pop().unwrap().is_none());
    }

    #[test]
    fn spec_keeps_pan_despite_background_reset() {
        let spec = InviteSpec {
            event_name: "Summer Camp".into(),
            event_details: "Fri 7pm".into(),
            background: catalog::default_background(),
            format: FormatId::Square,
            offsets: Offsets::default(),
            pan: Pan { x: 12.0, y: -4.0 },
        };
        // configure() needs a live backend; the ordering invariant is in the
        // layout alone.
        let mut layout = crate::layout::Layout::new();
        layout.select_background(spec.background.clone());
        layout.set_pan(spec.pan);
        assert_eq!(layout.pan(), Pan { x: 12.0, y: -4.0 });
    }
}
