//! One-time scene preparation before rendering.

use std::time::Instant;

use lume_core::Scene;

use crate::ambient::probe_open_scene;
use crate::photon::build_photon_map;

/// Finalise the scene, decode its textures, classify it as interior or
/// exterior and build the caustic photon map.
///
/// Runs on the calling thread (the photon map fans out internally). The
/// scene is read-only once this returns.
pub fn prepare_scene(scene: &mut Scene) {
    let start = Instant::now();

    scene.finalize();
    scene.load_textures();
    scene.open_scene = probe_open_scene(scene);

    if scene.config.caustics_threshold > 0.0 {
        log::info!("Building photon map");
        build_photon_map(scene);
    }

    log::info!("Prepared scene in {:.3} seconds", start.elapsed().as_secs_f32());
}
