use std::mem;

use glam::{UVec2, Vec4Swizzles};
use log::{info, trace};
use rayon::prelude::*;

use crate::cpu::{CpuGBuffer, CpuGBufferFrame, Image, TileList};
use crate::{gpu, utils, Camera, ConfigError, DenoiserConfig, DoubleBuffered};

/// Executes the denoiser's kernels over host images.
///
/// Produces the same results as [`crate::Denoiser`] (up to the precision of
/// the device's textures); each tile is processed by a single rayon task, the
/// same way each tile is processed by a single workgroup on the device.
#[derive(Debug)]
pub struct CpuDenoiser {
    config: DenoiserConfig,
    camera: Camera,
    gpu_camera: gpu::Camera,
    accumulated: Image,
    history: Image,
    moments: DoubleBuffered<Image>,
    working: DoubleBuffered<Image>,
    tiles: [TileList; 2],
    temporal: gpu::TemporalPingPong,
    pending_reset: bool,
    frame: u32,
}

impl CpuDenoiser {
    pub fn new(
        config: DenoiserConfig,
        camera: Camera,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            "Creating CPU denoiser: {}, signal={:?}",
            camera.describe(),
            config.signal,
        );

        let size = camera.size;
        let capacity = gpu::tile_count(size);

        Ok(Self {
            config,
            camera,
            gpu_camera: camera.serialize(&camera),
            accumulated: Image::new(size),
            history: Image::new(size),
            moments: DoubleBuffered::from_pair(
                Image::new(size),
                Image::new(size),
            ),
            working: DoubleBuffered::from_pair(
                Image::new(size),
                Image::new(size),
            ),
            tiles: gpu::TileKind::ALL.map(|kind| TileList::new(kind, capacity)),
            temporal: Default::default(),
            pending_reset: true,
            frame: 0,
        })
    }

    pub fn config(&self) -> &DenoiserConfig {
        &self.config
    }

    /// See: [`crate::Denoiser::update()`].
    pub fn update(&mut self, camera: Camera) {
        assert!(
            !self.camera.is_invalidated_by(&camera),
            "viewport changed from {} to {}; the denoiser has to be recreated",
            self.camera.describe(),
            camera.describe(),
        );

        self.gpu_camera = camera.serialize(&self.camera);
        self.camera = camera;
    }

    pub fn reset_history(&mut self) {
        self.pending_reset = true;
    }

    /// Denoises a single frame.
    ///
    /// `gbuffer_parity` says which of [`CpuGBuffer::frames`] holds the current
    /// frame; `signal` is the raw signal.
    pub fn render(
        &mut self,
        gbuffer: &CpuGBuffer,
        gbuffer_parity: gpu::PingPong,
        signal: &Image,
    ) {
        assert_eq!(self.camera.size, gbuffer.frame(gbuffer_parity).size());
        assert_eq!(self.camera.size, signal.size());

        self.frame += 1;
        self.temporal = self.temporal.next();

        let reset = mem::take(&mut self.pending_reset);

        utils::measure("cpu.reset_args", || self.reset_args());

        utils::measure("cpu.reprojection", || {
            self.reproject(gbuffer, gbuffer_parity, signal, reset)
        });

        trace!(
            "Frame {}: denoise_tiles={}, copy_tiles={}",
            self.frame,
            self.tiles(gpu::TileKind::Denoise).len(),
            self.tiles(gpu::TileKind::Copy).len(),
        );

        if self.config.filters() {
            let frame = gbuffer.frame(gbuffer_parity);
            let mut spatial = gpu::SpatialPingPong::default();

            for iteration in 0..self.config.atrous_iterations {
                let params = self.config.atrous_params(iteration);

                utils::measure("cpu.copy_tiles", || {
                    self.copy_tiles(spatial, &params)
                });

                utils::measure("cpu.atrous", || {
                    self.filter_tiles(frame, spatial, &params)
                });

                if self.config.commits_at(iteration) {
                    self.history = self.working.get(spatial.dst()).clone();
                }

                spatial = spatial.next();
            }
        }

        if self.config.commits_output() {
            self.history = self.output().clone();
        }
    }

    /// Output of the temporal stage of the most recent frame.
    pub fn accumulated(&self) -> &Image {
        &self.accumulated
    }

    /// Denoised signal of the most recent frame.
    pub fn output(&self) -> &Image {
        if !self.config.filters() {
            return &self.accumulated;
        }

        let last = self.config.atrous_iterations - 1;

        let side = if last % 2 == 0 {
            gpu::PingPong::A
        } else {
            gpu::PingPong::B
        };

        self.working.get(side)
    }

    /// Signal the next frame is going to reproject from.
    pub fn history(&self) -> &Image {
        &self.history
    }

    /// Moments written during the most recent frame.
    pub fn moments(&self) -> &Image {
        self.moments.get(self.temporal.curr())
    }

    pub fn tiles(&self, kind: gpu::TileKind) -> &TileList {
        &self.tiles[kind.index()]
    }

    fn reset_args(&self) {
        for tiles in &self.tiles {
            tiles.reset();
        }
    }

    fn reproject(
        &mut self,
        gbuffer: &CpuGBuffer,
        gbuffer_parity: gpu::PingPong,
        signal: &Image,
        reset: bool,
    ) {
        let params = self.config.reprojection_params(reset);
        let size = self.camera.size;
        let curr = gbuffer.frame(gbuffer_parity);
        let prev = gbuffer.frame(gbuffer_parity.next());
        let history = &self.history;
        let prev_moments = self.moments.get(self.temporal.prev());
        let tiles = &self.tiles;

        let accumulator = gpu::TemporalAccumulator {
            camera: &self.gpu_camera,
            params: &params,
        };

        let pixels: Vec<_> = all_tiles(size)
            .into_par_iter()
            .flat_map_iter(|tile| {
                let mut stats = gpu::TileStats::default();

                let pixels: Vec<_> = tile
                    .pixels(size)
                    .map(|pos| {
                        let acc = accumulator.run(
                            pos,
                            signal.get(pos).xyz(),
                            curr.surface(pos),
                            curr.motion(pos),
                            |pos| prev.surface(pos),
                            |pos| history.get(pos),
                            |pos| prev_moments.get(pos),
                        );

                        if !acc.is_sky() {
                            stats.add(
                                acc.variance(),
                                acc.moments.history_len(),
                            );
                        }

                        (pos, acc)
                    })
                    .collect();

                tiles[stats.classify(&params).index()].push(tile);

                pixels
            })
            .collect();

        let moments = self.moments.get_mut(self.temporal.curr());

        for (pos, acc) in pixels {
            self.accumulated.set(pos, acc.value);
            moments.set(pos, acc.moments.serialize());
        }
    }

    fn copy_tiles(
        &mut self,
        spatial: gpu::SpatialPingPong,
        params: &gpu::AtrousPassParams,
    ) {
        let size = self.camera.size;
        let src = self.source(spatial, params);

        let pixels: Vec<_> = self
            .tiles(gpu::TileKind::Copy)
            .tiles()
            .into_par_iter()
            .flat_map_iter(|tile| {
                tile.pixels(size).map(move |pos| (pos, src.get(pos)))
            })
            .collect();

        let dst = self.working.get_mut(spatial.dst());

        for (pos, value) in pixels {
            dst.set(pos, value);
        }
    }

    fn filter_tiles(
        &mut self,
        frame: &CpuGBufferFrame,
        spatial: gpu::SpatialPingPong,
        params: &gpu::AtrousPassParams,
    ) {
        let size = self.camera.size;
        let src = self.source(spatial, params);

        let filter = &gpu::AtrousFilter {
            camera: &self.gpu_camera,
            params,
        };

        let pixels: Vec<_> = self
            .tiles(gpu::TileKind::Denoise)
            .tiles()
            .into_par_iter()
            .flat_map_iter(|tile| {
                tile.pixels(size).map(move |pos| {
                    let value = filter.run(pos, |pos| {
                        (src.get(pos), frame.surface(pos))
                    });

                    (pos, value)
                })
            })
            .collect();

        let dst = self.working.get_mut(spatial.dst());

        for (pos, value) in pixels {
            dst.set(pos, value);
        }
    }

    /// First iteration reads the accumulated signal, the following ones read
    /// what the previous iteration wrote.
    fn source(
        &self,
        spatial: gpu::SpatialPingPong,
        params: &gpu::AtrousPassParams,
    ) -> &Image {
        if params.step == 1 {
            &self.accumulated
        } else {
            self.working.get(spatial.src())
        }
    }
}

impl Drop for CpuDenoiser {
    fn drop(&mut self) {
        info!("Deleting CPU denoiser: {}", self.camera.describe());
    }
}

fn all_tiles(size: UVec2) -> Vec<gpu::TileCoord> {
    let grid = gpu::tile_grid(size);

    (0..grid.y)
        .flat_map(|y| (0..grid.x).map(move |x| gpu::TileCoord::new(x, y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec4, Mat4, Vec3, Vec4};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn camera(size: UVec2) -> Camera {
        Camera::new(
            Mat4::look_at_rh(Vec3::ZERO, -Vec3::Z, Vec3::Y),
            Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0),
            size,
        )
    }

    fn frame(size: UVec2, depth: f32) -> CpuGBufferFrame {
        CpuGBufferFrame {
            normal: Image::filled(size, vec4(0.0, 0.0, 1.0, 0.0)),
            depth: Image::filled(size, Vec4::splat(depth)),
            material: Image::filled(size, vec4(0.5, 0.0, 0.0, 0.0)),
            motion: Image::new(size),
        }
    }

    fn gbuffer(size: UVec2, depth: f32) -> CpuGBuffer {
        CpuGBuffer::new([frame(size, depth), frame(size, depth)])
    }

    fn signal(size: UVec2, value: f32) -> Image {
        Image::filled(size, Vec4::splat(value))
    }

    fn noise(size: UVec2, rng: &mut StdRng) -> Image {
        let values: Vec<f32> =
            (0..(size.x * size.y)).map(|_| rng.gen()).collect();

        Image::from_fn(size, |pos| {
            Vec4::splat(values[(pos.y * size.x + pos.x) as usize])
        })
    }

    /// Renders consecutive frames of a static scene, flipping the G-buffer's
    /// parity the way a renderer would.
    struct Scene {
        target: CpuDenoiser,
        gbuffer: CpuGBuffer,
        parity: gpu::PingPong,
    }

    impl Scene {
        fn new(config: DenoiserConfig, size: UVec2) -> Self {
            Self {
                target: CpuDenoiser::new(config, camera(size)).unwrap(),
                gbuffer: gbuffer(size, 10.0),
                parity: gpu::PingPong::B,
            }
        }

        fn render(&mut self, signal: &Image) {
            self.parity = self.parity.next();
            self.target.update(self.target.camera);
            self.target.render(&self.gbuffer, self.parity, signal);
        }

        fn assert_partition(&self) {
            let size = self.target.camera.size;

            let mut tiles: Vec<_> = gpu::TileKind::ALL
                .iter()
                .flat_map(|&kind| self.target.tiles(kind).tiles())
                .map(|tile| tile.pack())
                .collect();

            tiles.sort();
            tiles.dedup();

            assert_eq!(gpu::tile_count(size), tiles.len());

            assert_eq!(
                gpu::tile_count(size),
                self.target.tiles(gpu::TileKind::Denoise).len()
                    + self.target.tiles(gpu::TileKind::Copy).len()
            );

            for kind in gpu::TileKind::ALL {
                let tiles = self.target.tiles(kind);

                assert_eq!(tiles.len(), tiles.args().len());
                assert_eq!(tiles.len() as u32, tiles.args().dispatch.x);
                assert_eq!(1, tiles.args().dispatch.y);
            }
        }
    }

    #[test]
    fn confident_history_is_copied_through() {
        let size = uvec2(16, 16);

        let config = DenoiserConfig {
            blend_alpha: 0.1,
            ..DenoiserConfig::shadow()
        };

        let mut scene = Scene::new(config, size);

        for _ in 0..12 {
            scene.render(&signal(size, 0.5));
        }

        scene.render(&signal(size, 1.0));

        for pixel in scene.target.accumulated().pixels() {
            assert_relative_eq!(0.55, pixel.x, epsilon = 1e-5);
            assert!(pixel.w < 0.05);
        }

        assert_eq!(4, scene.target.tiles(gpu::TileKind::Copy).len());
        assert!(scene.target.tiles(gpu::TileKind::Denoise).is_empty());
        assert_eq!(scene.target.accumulated(), scene.target.output());
        scene.assert_partition();
    }

    #[test]
    fn first_frame_takes_raw_signal() {
        let size = uvec2(16, 16);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        scene.render(&signal(size, 1.0));

        for pixel in scene.target.accumulated().pixels() {
            assert_eq!(1.0, pixel.x);
        }

        // Fresh history always needs filtering
        assert_eq!(4, scene.target.tiles(gpu::TileKind::Denoise).len());
        scene.assert_partition();
    }

    #[test]
    fn reset_history_takes_raw_signal() {
        let size = uvec2(16, 16);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        for _ in 0..4 {
            scene.render(&signal(size, 0.25));
        }

        scene.target.reset_history();
        scene.render(&signal(size, 1.0));

        for pixel in scene.target.accumulated().pixels() {
            assert_eq!(1.0, pixel.x);
        }

        for pixel in scene.target.moments().pixels() {
            assert_eq!(1.0, pixel.z);
        }
    }

    #[test]
    fn tiles_are_partitioned() {
        let size = uvec2(20, 13);
        let mut rng = StdRng::seed_from_u64(1234);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        for _ in 0..8 {
            scene.render(&noise(size, &mut rng));
            scene.assert_partition();
        }
    }

    #[test]
    fn sky_tiles_are_copied() {
        let size = uvec2(16, 8);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        scene.gbuffer = gbuffer(size, 0.0);
        scene.render(&signal(size, 0.75));

        assert_eq!(2, scene.target.tiles(gpu::TileKind::Copy).len());

        for pixel in scene.target.output().pixels() {
            assert_eq!(0.75, pixel.x);
        }
    }

    #[test]
    fn zero_iterations_output_accumulated_signal() {
        let size = uvec2(16, 16);
        let mut rng = StdRng::seed_from_u64(4321);

        let config = DenoiserConfig {
            atrous_iterations: 0,
            ..DenoiserConfig::shadow()
        };

        let mut scene = Scene::new(config, size);

        for _ in 0..3 {
            scene.render(&noise(size, &mut rng));

            assert_eq!(scene.target.accumulated(), scene.target.output());
            assert_eq!(scene.target.accumulated(), scene.target.history());
        }
    }

    #[test]
    fn static_variance_decays() {
        let size = uvec2(16, 16);
        let mut rng = StdRng::seed_from_u64(42);
        let config = DenoiserConfig::shadow();
        let mut scene = Scene::new(config.clone(), size);

        for _ in 0..8 {
            scene.render(&noise(size, &mut rng));
        }

        let variance = |scene: &Scene| -> Vec<f32> {
            scene
                .target
                .accumulated()
                .pixels()
                .iter()
                .map(|pixel| pixel.w)
                .collect()
        };

        let mut prev_variance = variance(&scene);

        assert!(prev_variance.iter().all(|&variance| variance > 0.0));

        // Each pixel now keeps receiving its own mean, so its first moment
        // stays put while the second one converges towards it
        let mean = scene.target.moments().clone();
        let raw = Image::from_fn(size, |pos| Vec4::splat(mean.get(pos).x));

        for _ in 0..10 {
            scene.render(&raw);

            let curr_variance = variance(&scene);

            for (curr, prev) in curr_variance.iter().zip(&prev_variance) {
                assert!(curr < prev);

                assert_relative_eq!(
                    prev * (1.0 - config.moments_alpha),
                    *curr,
                    max_relative = 1e-3,
                );
            }

            prev_variance = curr_variance;
        }
    }

    #[test]
    fn depth_discontinuity_takes_raw_signal() {
        let size = uvec2(16, 16);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        for _ in 0..4 {
            scene.render(&signal(size, 0.25));
        }

        // Next frame is rendered into the other side of the G-buffer; the
        // surface moved further away than the consistency epsilon allows
        let next = scene.parity.next();

        scene.gbuffer.frame_mut(next).depth =
            Image::filled(size, Vec4::splat(10.5));
        scene.render(&signal(size, 1.0));

        for pixel in scene.target.accumulated().pixels() {
            assert_eq!(1.0, pixel.x);
        }
    }

    #[test]
    fn filtering_smooths_noise() {
        let size = uvec2(32, 32);
        let mut rng = StdRng::seed_from_u64(7);
        let mut scene = Scene::new(DenoiserConfig::shadow(), size);

        scene.render(&noise(size, &mut rng));

        let spread = |image: &Image| {
            let values: Vec<_> =
                image.pixels().iter().map(|pixel| pixel.x).collect();

            let mean = values.iter().sum::<f32>() / values.len() as f32;

            values.iter().map(|value| (value - mean).powi(2)).sum::<f32>()
                / values.len() as f32
        };

        assert!(
            spread(scene.target.output())
                < spread(scene.target.accumulated()) * 0.5
        );
    }

    #[test]
    fn invalid_config() {
        let config = DenoiserConfig {
            atrous_radius: 0,
            ..DenoiserConfig::shadow()
        };

        assert_eq!(
            Some(ConfigError::ZeroRadius),
            CpuDenoiser::new(config, camera(uvec2(8, 8))).err(),
        );
    }
}
