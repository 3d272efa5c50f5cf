/// Object that can be attached to a pipeline, e.g. a buffer or a texture
pub trait Bindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)>;
}

/// Object that can be attached to a pipeline and exists in two versions, one
/// per side of a ping-pong domain (see: [`crate::BindGroupDomain`])
pub trait DoubleBufferedBindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])>;
}

impl<T> DoubleBufferedBindable for T
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        T::bind(self, binding)
            .into_iter()
            .map(|(layout, resource)| (layout, [resource.clone(), resource]))
            .collect()
    }
}

/// Layout entry of a compute-only binding.
pub fn compute_entry(
    binding: u32,
    ty: wgpu::BindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty,
        count: None,
    }
}
