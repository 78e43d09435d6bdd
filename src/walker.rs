//! Walks the course → section → resource tree and collects the worklist.
//!
//! Courses are traversed one at a time (the outermost tier is assumed small);
//! sections and resources each run under their own bounded runner. The
//! worklist is not shared mutable state: every bounded stage returns its own
//! `Vec<SyncTask>` and the results are flattened upward.

use tracing::{debug, info};

use crate::config::ConcurrencyConfig;
use crate::evaluate::{evaluate, SyncTask};
use crate::runner::run_bounded;
use crate::source::{Course, CourseSource, SourceError};
use crate::storage::Storage;

/// Replaces characters that would add unintended path levels. Course and
/// section names come from user-entered titles and routinely contain `/`.
fn sanitise(name: &str) -> String {
    name.replace(['/', ':'], "_")
}

/// Destination path: `<sync-root>/<course-name>/<section-name>/<filename>`.
///
/// Uniqueness is not enforced; duplicate filenames within a section collide
/// and overwrite at upload time.
pub fn dest_path(sync_root: &str, course: &str, section: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        sync_root.trim_end_matches('/'),
        sanitise(course),
        sanitise(section),
        sanitise(filename)
    )
}

/// Walks all courses and returns the flat worklist of resources that need
/// transferring.
///
/// Listing and header failures are not recovered locally: the first error
/// aborts the walk once in-flight siblings have settled.
pub async fn collect_worklist<S, D>(
    source: &S,
    storage: &D,
    courses: &[Course],
    sync_root: &str,
    concurrency: &ConcurrencyConfig,
) -> Result<Vec<SyncTask>, SourceError>
where
    S: CourseSource,
    D: Storage,
{
    let mut worklist: Vec<SyncTask> = Vec::new();

    for course in courses {
        info!(course = %course.name, "Fetching resources for course");
        let sections = source.list_sections(course).await?;

        let per_section = run_bounded(sections, concurrency.sections, |section| async move {
            let resources = source.list_resources(&section).await?;

            // A section with no resources gets no further work and no error.
            if resources.is_empty() {
                debug!(section = %section.name, "Section has no resources, skipping");
                return Ok(Vec::new());
            }

            let evaluated = run_bounded(resources, concurrency.resources, |resource| {
                let path = dest_path(sync_root, &course.name, &section.name, &resource.filename);
                async move { evaluate(source, storage, resource, path).await }
            })
            .await;

            let mut tasks = Vec::new();
            for outcome in evaluated {
                if let Some(task) = outcome? {
                    tasks.push(task);
                }
            }
            Ok::<_, SourceError>(tasks)
        })
        .await;

        for outcome in per_section {
            worklist.extend(outcome?);
        }
    }

    debug!(queued = worklist.len(), "Walk complete");
    Ok(worklist)
}
