//! Fork/join episodes for the parallel stages.
//!
//! Every parallel stage builds a fresh set of [`WorkerDescriptor`]s, spawns a
//! dedicated pool with exactly one thread per descriptor, and blocks until all
//! of them have finished. Nothing outlives the episode: the descriptors are
//! consumed by the workers and the pool is torn down on return, so the next
//! stage only ever sees fully written output.

use std::ops::Range;

use log::trace;

use crate::error::CannyError;

/// One worker's view of a stage.
///
/// `output` is the worker's own band of the stage output, so writes from
/// different workers can never overlap.
#[derive(Debug)]
pub(crate) struct WorkerDescriptor<'a, I: ?Sized, O> {
    pub id: usize,
    pub rows: Range<usize>,
    pub input: &'a I,
    pub output: O,
}

/// Pair each row range with its output band.
pub(crate) fn describe_workers<'a, I: ?Sized, O>(
    ranges: &[Range<usize>],
    input: &'a I,
    outputs: Vec<O>,
) -> Vec<WorkerDescriptor<'a, I, O>> {
    debug_assert_eq!(ranges.len(), outputs.len());
    let mut descriptors = Vec::with_capacity(ranges.len());
    for (id, (rows, output)) in ranges.iter().cloned().zip(outputs).enumerate() {
        descriptors.push(WorkerDescriptor {
            id,
            rows,
            input,
            output,
        });
    }
    descriptors
}

/// Run `work` once per descriptor on a dedicated pool and wait for all of them.
///
/// A worker with an empty row range still runs; stage code is expected to do
/// nothing in that case.
pub(crate) fn fork_join<'a, I, O, F>(
    stage: &'static str,
    descriptors: Vec<WorkerDescriptor<'a, I, O>>,
    work: F,
) -> Result<(), CannyError>
where
    I: Sync + ?Sized,
    O: Send,
    F: Fn(WorkerDescriptor<'a, I, O>) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(descriptors.len().max(1))
        .thread_name(move |i| format!("canny-{stage}-{i}"))
        .build()
        .map_err(|source| CannyError::ThreadPool { stage, source })?;

    pool.scope(|scope| {
        for descriptor in descriptors {
            let work = &work;
            scope.spawn(move |_| {
                trace!(
                    "{stage}: worker {} rows {}..{}",
                    descriptor.id,
                    descriptor.rows.start,
                    descriptor.rows.end
                );
                work(descriptor);
            });
        }
    });

    Ok(())
}
