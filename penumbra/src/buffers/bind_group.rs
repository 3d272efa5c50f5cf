use crate::{gpu, DoubleBufferedBindable};

/// Ping-pong domain that selects between the two variants of a bind group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindGroupDomain {
    /// Bind group exists in one variant only
    Static,

    /// Flips together with the G-buffer's frame parity
    GBuffer,

    /// Flips once per frame (see: [`gpu::TemporalPingPong`])
    Temporal,

    /// Flips once per à-trous iteration (see: [`gpu::SpatialPingPong`])
    Spatial,
}

/// State of every ping-pong domain at the moment a pass is recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameParity {
    pub gbuffer: gpu::PingPong,
    pub temporal: gpu::TemporalPingPong,
    pub spatial: gpu::SpatialPingPong,
}

impl FrameParity {
    pub fn is_alternate(&self, domain: BindGroupDomain) -> bool {
        match domain {
            BindGroupDomain::Static => false,
            BindGroupDomain::GBuffer => self.gbuffer.is_alternate(),
            BindGroupDomain::Temporal => self.temporal.curr().is_alternate(),
            BindGroupDomain::Spatial => self.spatial.dst().is_alternate(),
        }
    }
}

#[derive(Debug)]
pub struct BindGroup {
    domain: BindGroupDomain,
    bind_group_a: wgpu::BindGroup,
    bind_group_b: Option<wgpu::BindGroup>,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl BindGroup {
    pub fn builder<'ctx>(
        label: impl ToString,
        domain: BindGroupDomain,
    ) -> BindGroupBuilder<'ctx> {
        BindGroupBuilder {
            label: label.to_string(),
            domain,
            layouts: Default::default(),
            resources: Default::default(),
        }
    }

    pub fn get(&self, parity: &FrameParity) -> &wgpu::BindGroup {
        match &self.bind_group_b {
            Some(bind_group_b) if parity.is_alternate(self.domain) => {
                bind_group_b
            }
            _ => &self.bind_group_a,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

pub struct BindGroupBuilder<'a> {
    label: String,
    domain: BindGroupDomain,
    layouts: Vec<wgpu::BindGroupLayoutEntry>,
    resources: Vec<[wgpu::BindingResource<'a>; 2]>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn add(mut self, item: &'a dyn DoubleBufferedBindable) -> Self {
        for (layout, resources) in item.bind(self.resources.len() as u32) {
            self.layouts.push(layout);
            self.resources.push(resources);
        }

        self
    }

    pub fn build(self, device: &wgpu::Device) -> BindGroup {
        let label = format!("penumbra_{}", self.label);

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}_layout")),
                entries: &self.layouts,
            });

        let (entries_a, entries_b): (Vec<_>, Vec<_>) = self
            .resources
            .into_iter()
            .enumerate()
            .map(|(binding, resources)| {
                let [entry_a, entry_b] =
                    resources.map(|resource| wgpu::BindGroupEntry {
                        binding: binding as _,
                        resource,
                    });

                (entry_a, entry_b)
            })
            .unzip();

        let bind_group_a =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}_a")),
                layout: &bind_group_layout,
                entries: &entries_a,
            });

        let bind_group_b = if self.domain == BindGroupDomain::Static {
            None
        } else {
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}_b")),
                layout: &bind_group_layout,
                entries: &entries_b,
            }))
        };

        BindGroup {
            domain: self.domain,
            bind_group_a,
            bind_group_b,
            bind_group_layout,
        }
    }
}
