use std::marker::PhantomData;
use std::mem;
use std::ops::Range;

use bytemuck::Pod;
use glam::UVec2;
use log::debug;

use crate::{
    BindGroup, BindGroupBuilder, BindGroupDomain, DoubleBufferedBindable,
    FrameParity,
};

#[derive(Debug)]
pub struct DenoiserComputePass<P = ()> {
    label: String,
    bind_groups: Vec<BindGroup>,
    pipeline: wgpu::ComputePipeline,
    _params: PhantomData<P>,
}

impl<P> DenoiserComputePass<P>
where
    P: Pod,
{
    pub fn builder<'a>(label: impl ToString) -> DenoiserPassBuilder<'a, P> {
        DenoiserPassBuilder {
            label: label.to_string(),
            bind_groups: Default::default(),
            _params: Default::default(),
        }
    }

    /// Dispatches `size` workgroups.
    pub fn run(
        &self,
        parity: &FrameParity,
        encoder: &mut wgpu::CommandEncoder,
        size: UVec2,
        params: P,
    ) {
        let mut pass = self.begin(parity, encoder, params);

        pass.dispatch_workgroups(size.x, size.y, 1);
    }

    /// Dispatches as many workgroups as the arguments stored at `offset`
    /// within `args` say.
    pub fn run_indirect(
        &self,
        parity: &FrameParity,
        encoder: &mut wgpu::CommandEncoder,
        args: &wgpu::Buffer,
        offset: u64,
        params: P,
    ) {
        let mut pass = self.begin(parity, encoder, params);

        pass.dispatch_workgroups_indirect(args, offset);
    }

    fn begin<'e>(
        &self,
        parity: &FrameParity,
        encoder: &'e mut wgpu::CommandEncoder,
        params: P,
    ) -> wgpu::ComputePass<'e> {
        let label = format!("penumbra_{}_pass", self.label);

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);

        if mem::size_of::<P>() > 0 {
            pass.set_push_constants(0, bytemuck::bytes_of(&params));
        }

        for (bind_group_idx, bind_group) in self.bind_groups.iter().enumerate()
        {
            pass.set_bind_group(
                bind_group_idx as u32,
                bind_group.get(parity),
                &[],
            );
        }

        pass
    }
}

pub struct DenoiserPassBuilder<'a, P> {
    label: String,
    bind_groups: Vec<BindGroupBuilder<'a>>,
    _params: PhantomData<P>,
}

impl<'a, P> DenoiserPassBuilder<'a, P>
where
    P: Pod,
{
    /// Adds a bind group; its index is the order of `bind()` calls.
    pub fn bind<const N: usize>(
        mut self,
        domain: BindGroupDomain,
        items: [&'a dyn DoubleBufferedBindable; N],
    ) -> Self {
        let mut bind_group = BindGroup::builder(
            format!("{}_bg{}", self.label, self.bind_groups.len()),
            domain,
        );

        for item in items {
            bind_group = bind_group.add(item);
        }

        self.bind_groups.push(bind_group);
        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        (module, entry_point): &(wgpu::ShaderModule, &'static str),
    ) -> DenoiserComputePass<P> {
        debug!("Initializing pass: {}:{}", self.label, entry_point);

        let bind_groups: Vec<_> = self
            .bind_groups
            .into_iter()
            .map(|bg| bg.build(device))
            .collect();

        let bind_group_layouts: Vec<_> =
            bind_groups.iter().map(|bg| bg.layout()).collect();

        let push_constant_ranges = if mem::size_of::<P>() > 0 {
            vec![wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: Range {
                    start: 0,
                    end: mem::size_of::<P>() as u32,
                },
            }]
        } else {
            vec![]
        };

        let pipeline_layout_label =
            format!("penumbra_{}_pipeline_layout", self.label);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&pipeline_layout_label),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &push_constant_ranges,
            });

        let pipeline_label = format!("penumbra_{}_pipeline", self.label);

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&pipeline_label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions {
                    zero_initialize_workgroup_memory: false,
                    ..Default::default()
                },
                cache: None,
            });

        DenoiserComputePass {
            label: self.label,
            bind_groups,
            pipeline,
            _params: PhantomData,
        }
    }
}
