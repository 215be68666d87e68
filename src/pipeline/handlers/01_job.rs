use std::sync::Arc;

use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::output::manifest::{CronJob, Job};
use crate::output::to_yaml_document;
use crate::overrides::resolve_docker_model;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;
use crate::util::is_blank;

pub struct JobHandler;

impl ArtifactHandler for JobHandler {
    fn name(&self) -> &'static str {
        "JobHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        let fs = Arc::clone(&context.fs);
        let jar_file_name = context.jar_file_name();
        let job = context
            .job
            .as_mut()
            .ok_or_else(|| BuildError::missing("job", "no job model to render"))?;

        if is_blank(Some(&job.name)) {
            return Err(BuildError::missing(
                "job.name",
                "artifact name could not be derived from the executable",
            ));
        }
        if is_blank(Some(&job.image)) {
            return Err(BuildError::missing(
                "job.image",
                format!("no image set for {}", job.name),
            ));
        }

        let docker =
            resolve_docker_model(job, context.overrides.as_ref(), &jar_file_name?, fs.as_ref())?;

        let content = match job.schedule.as_deref() {
            Some(schedule) => {
                debug!(job = %job.name, schedule, "Rendering cron job");
                to_yaml_document(&CronJob::new(&*job, schedule))?
            }
            None => to_yaml_document(&Job::from(&*job))?,
        };
        context.docker = Some(docker);
        context.queue(ArtifactKind::Job, content);
        Ok(())
    }
}
