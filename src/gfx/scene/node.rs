//! Scene nodes: the animated boxes that make up the backdrop architecture
//!
//! Nodes are created once by the scene builder and mutated every tick by the
//! animation driver. GPU resources are attached lazily once a device exists.

use cgmath::{Matrix4, Rad, Vector3};
use wgpu::Device;

use crate::gfx::geometry::GeometryData;

/// Position, yaw and scale of a node.
///
/// The backdrop only ever rotates nodes around the vertical axis, so a single
/// yaw angle is kept instead of a full orientation.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            yaw: 0.0,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builds the model matrix. Order matters: T * R * S.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Surface parameters consumed by the mesh shader.
#[derive(Debug, Clone, Copy)]
pub struct MaterialParams {
    /// RGBA base color; the alpha channel is the node opacity.
    pub color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialParams {
    pub fn new(color: [f32; 4], roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
        }
    }

    /// Opaque gray-scale material, used for the randomized filler boxes.
    pub fn gray(lightness: f32, roughness: f32, metalness: f32) -> Self {
        Self::new([lightness, lightness, lightness, 1.0], roughness, metalness)
    }
}

/// Per-node uniform data uploaded every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// roughness, metalness, unused, unused
    pub params: [f32; 4],
}

/// GPU-side resources for one node.
pub struct NodeGpuResources {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
}

/// One box in the backdrop scene.
pub struct SceneNode {
    pub name: String,
    pub geometry: GeometryData,
    pub transform: Transform,
    pub material: MaterialParams,
    /// Static nodes (the platform) are skipped by the animation pass.
    pub animated: bool,
    pub gpu_resources: Option<NodeGpuResources>,
}

impl SceneNode {
    pub fn new(
        name: &str,
        geometry: GeometryData,
        transform: Transform,
        material: MaterialParams,
    ) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            transform,
            material,
            animated: true,
            gpu_resources: None,
        }
    }

    /// Marks the node as excluded from the per-tick animation pass.
    pub fn with_static_transform(mut self) -> Self {
        self.animated = false;
        self
    }

    /// Builds the uniform contents for the current transform and material.
    pub fn model_uniform(&self) -> ModelUniform {
        let matrix = self.transform.matrix();
        let model: &[f32; 16] = matrix.as_ref();
        ModelUniform {
            model: [
                [model[0], model[1], model[2], model[3]],
                [model[4], model[5], model[6], model[7]],
                [model[8], model[9], model[10], model[11]],
                [model[12], model[13], model[14], model[15]],
            ],
            color: self.material.color,
            params: [self.material.roughness, self.material.metalness, 0.0, 0.0],
        }
    }

    /// Creates vertex, index and uniform buffers plus the model bind group.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        if self.gpu_resources.is_some() {
            return;
        }

        let (vertices, indices) = self.geometry.to_render_format();

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} vertices", self.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} indices", self.name)),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let model_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} model uniform", self.name)),
                contents: bytemuck::bytes_of(&self.model_uniform()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} model bind group", self.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(NodeGpuResources {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            model_buffer,
            model_bind_group,
        });
    }

    /// Syncs the current transform and material to the GPU if resources exist.
    pub fn update_gpu_uniform(&self, queue: &wgpu::Queue) {
        if let Some(gpu_resources) = &self.gpu_resources {
            queue.write_buffer(
                &gpu_resources.model_buffer,
                0,
                bytemuck::bytes_of(&self.model_uniform()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn test_transform_matrix_translates() {
        let transform = Transform::at(Vector3::new(1.0, 2.0, 3.0));
        let m = transform.matrix();
        assert_eq!(m.w.x, 1.0);
        assert_eq!(m.w.y, 2.0);
        assert_eq!(m.w.z, 3.0);
    }

    #[test]
    fn test_node_starts_without_gpu_resources() {
        let node = SceneNode::new(
            "block",
            generate_box(1.0, 1.0, 1.0),
            Transform::at(Vector3::new(0.0, 0.0, 0.0)),
            MaterialParams::gray(0.2, 0.8, 0.2),
        );
        assert!(node.gpu_resources.is_none());
        assert!(node.animated);
    }

    #[test]
    fn test_model_uniform_carries_material() {
        let node = SceneNode::new(
            "glass",
            generate_box(2.0, 8.0, 2.0),
            Transform::at(Vector3::new(-5.0, 1.0, -3.0)),
            MaterialParams::new([0.53, 0.8, 1.0, 0.4], 0.1, 0.1),
        );
        let uniform = node.model_uniform();
        assert_eq!(uniform.color[3], 0.4);
        assert_eq!(uniform.params[0], 0.1);
        assert_eq!(uniform.model[3][0], -5.0);
    }
}
