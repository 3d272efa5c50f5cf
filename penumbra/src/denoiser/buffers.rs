use std::mem;

use log::debug;

use crate::{
    gpu, Camera, DoubleBuffered, MappedUniformBuffer, StorageBuffer, Texture,
};

/// Format of all signal textures (accumulated, history, working pair).
pub const SIGNAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Format of the moments textures.
pub const MOMENTS_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba32Float;

#[derive(Debug)]
pub struct DenoiserBuffers {
    pub camera: MappedUniformBuffer<gpu::Camera>,

    /// Output of the temporal stage; value in `rgb`, variance in `a`
    pub accumulated: Texture,

    /// Signal the next frame reprojects from
    pub history: Texture,

    /// Written during the current frame (see: [`gpu::TemporalPingPong`])
    pub moments: DoubleBuffered<Texture>,

    /// Ping-pong pair the à-trous iterations filter between
    pub working: DoubleBuffered<Texture>,

    pub denoise_tiles: StorageBuffer,
    pub copy_tiles: StorageBuffer,

    /// `[gpu::TileArgs; 2]`, indexed by [`gpu::TileKind`]
    pub tile_args: StorageBuffer,
}

impl DenoiserBuffers {
    pub fn new(
        device: &wgpu::Device,
        camera: &Camera,
        prev_camera: &Camera,
    ) -> Self {
        debug!("Initializing denoiser buffers");

        let size = camera.size;
        let tiles = gpu::tile_count(size);
        let max_workgroups =
            device.limits().max_compute_workgroups_per_dimension;

        // Both lists get dispatched with this many workgroups when full
        let max_dispatch = gpu::DispatchArgs::for_tiles(tiles as u32);

        assert!(
            max_dispatch.x.max(max_dispatch.y) <= max_workgroups,
            "viewport {}x{} needs a dispatch of {}x{} workgroups, but the \
             device dispatches at most {max_workgroups} per dimension",
            size.x,
            size.y,
            max_dispatch.x,
            max_dispatch.y,
        );

        let camera = MappedUniformBuffer::new(
            device,
            "penumbra_camera",
            camera.serialize(prev_camera),
        );

        let accumulated =
            Texture::new(device, "penumbra_accumulated", size, SIGNAL_FORMAT);

        let history =
            Texture::new(device, "penumbra_history", size, SIGNAL_FORMAT);

        let moments = DoubleBuffered::<Texture>::new(
            device,
            "penumbra_moments",
            size,
            MOMENTS_FORMAT,
        );

        let working = DoubleBuffered::<Texture>::new(
            device,
            "penumbra_working",
            size,
            SIGNAL_FORMAT,
        );

        let tile_list_size = tiles * mem::size_of::<gpu::TileCoord>();

        let denoise_tiles = StorageBuffer::new(
            device,
            "penumbra_denoise_tiles",
            tile_list_size,
        );

        let copy_tiles =
            StorageBuffer::new(device, "penumbra_copy_tiles", tile_list_size);

        let tile_args = StorageBuffer::new_indirect(
            device,
            "penumbra_tile_args",
            gpu::TileKind::ALL.len() * mem::size_of::<gpu::TileArgs>(),
        );

        Self {
            camera,
            accumulated,
            history,
            moments,
            working,
            denoise_tiles,
            copy_tiles,
            tile_args,
        }
    }

    /// Byte offset of given list's arguments within [`Self::tile_args`].
    pub fn args_offset(kind: gpu::TileKind) -> u64 {
        (kind.index() * mem::size_of::<gpu::TileArgs>()) as u64
    }
}
