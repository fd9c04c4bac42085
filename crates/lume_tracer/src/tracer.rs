//! Render context.

use lume_core::{Config, Scene};
use lume_math::Vec3;

use crate::intersect::{intersect, Intersection};
use crate::scheduler::TaskScheduler;

/// Everything a render needs: the prepared scene, the configuration in
/// effect and the task scheduler. One tracer is shared by all render
/// threads.
#[derive(Debug)]
pub struct Tracer<'s> {
    pub(crate) scene: &'s Scene,
    pub(crate) config: Config,
    pub(crate) scheduler: TaskScheduler,
}

impl<'s> Tracer<'s> {
    /// Tracer using the scene's own configuration.
    pub fn new(scene: &'s Scene) -> Self {
        Self::with_config(scene, scene.config.clone())
    }

    /// Tracer with a configuration that overrides the scene's.
    pub fn with_config(scene: &'s Scene, config: Config) -> Self {
        let scheduler = TaskScheduler::new(config.max_parallel_tasks);
        Self { scene, config, scheduler }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Intersection<'s> {
        intersect(self.scene, origin, direction)
    }
}
