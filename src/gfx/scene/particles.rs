//! Point-particle field
//!
//! A fixed-size cloud of softly glowing particles behind the architecture.
//! The buffer length is decided at construction and never changes for the
//! lifetime of the scene; every tick only mutates positions in place.

use cgmath::{Matrix4, Rad};
use rand::Rng;
use wgpu::Device;

/// Number of particles in the field.
pub const PARTICLE_COUNT: usize = 300;

/// Half-extent of the cube the particles are scattered in.
const SPREAD: f32 = 12.5;

/// One particle as stored in the GPU storage buffer (16-byte stride).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    /// Per-particle size multiplier in [0, 1).
    pub scale: f32,
}

/// Uniform data for the particle pipeline, uploaded every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniform {
    pub model: [[f32; 4]; 4],
    /// RGB color plus field opacity.
    pub color: [f32; 4],
    /// base size, unused, unused, unused
    pub params: [f32; 4],
}

/// GPU-side resources for the particle field.
pub struct ParticleGpuResources {
    pub instance_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub struct ParticleField {
    particles: Vec<ParticleInstance>,
    /// Whole-field rotation around the vertical axis, keyed by elapsed time.
    pub yaw: f32,
    /// Whole-field tilt, keyed by the smoothed pointer offset.
    pub pitch: f32,
    pub gpu_resources: Option<ParticleGpuResources>,
}

impl ParticleField {
    /// Scatters [PARTICLE_COUNT] particles uniformly in a cube around the
    /// origin with randomized per-particle scales.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| ParticleInstance {
                position: [
                    rng.random_range(-SPREAD..SPREAD),
                    rng.random_range(-SPREAD..SPREAD),
                    rng.random_range(-SPREAD..SPREAD),
                ],
                scale: rng.random_range(0.0..1.0),
            })
            .collect();

        Self {
            particles,
            yaw: 0.0,
            pitch: 0.0,
            gpu_resources: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[ParticleInstance] {
        &self.particles
    }

    /// Advances the gentle floating wave by one tick.
    ///
    /// Each particle drifts vertically on a sine keyed by elapsed time and
    /// its own x-coordinate, which desynchronizes the columns. The field as
    /// a whole slowly spins and tilts toward the pointer.
    pub fn advance(&mut self, elapsed: f32, pointer_y: f32) {
        self.yaw = elapsed * 0.05;
        self.pitch = pointer_y * 0.1;

        for particle in &mut self.particles {
            particle.position[1] += (elapsed * 0.5 + particle.position[0]).sin() * 0.002;
        }
    }

    /// Whole-field model matrix from the current yaw and pitch.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.pitch)) * Matrix4::from_angle_y(Rad(self.yaw))
    }

    /// Builds the uniform contents for the current field state.
    pub fn uniform(&self) -> ParticleUniform {
        let matrix = self.model_matrix();
        let model: &[f32; 16] = matrix.as_ref();
        ParticleUniform {
            model: [
                [model[0], model[1], model[2], model[3]],
                [model[4], model[5], model[6], model[7]],
                [model[8], model[9], model[10], model[11]],
                [model[12], model[13], model[14], model[15]],
            ],
            color: [1.0, 1.0, 1.0, 0.6],
            params: [0.08, 0.0, 0.0, 0.0],
        }
    }

    /// Creates the storage and uniform buffers plus the bind group.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        if self.gpu_resources.is_some() {
            return;
        }

        let instance_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("particle instances"),
                contents: bytemuck::cast_slice(&self.particles),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            },
        );

        let uniform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("particle uniform"),
                contents: bytemuck::bytes_of(&self.uniform()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.as_entire_binding(),
                },
            ],
        });

        self.gpu_resources = Some(ParticleGpuResources {
            instance_buffer,
            uniform_buffer,
            bind_group,
        });
    }

    /// Syncs particle positions and the field uniform to the GPU.
    pub fn update_gpu(&self, queue: &wgpu::Queue) {
        if let Some(gpu_resources) = &self.gpu_resources {
            queue.write_buffer(
                &gpu_resources.instance_buffer,
                0,
                bytemuck::cast_slice(&self.particles),
            );
            queue.write_buffer(
                &gpu_resources.uniform_buffer,
                0,
                bytemuck::bytes_of(&self.uniform()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_field_has_fixed_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::new(&mut rng);
        assert_eq!(field.len(), PARTICLE_COUNT);
    }

    #[test]
    fn test_count_is_invariant_across_ticks() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ParticleField::new(&mut rng);
        for i in 0..500 {
            field.advance(i as f32 * 0.016, 0.25);
        }
        assert_eq!(field.len(), PARTICLE_COUNT);
    }

    #[test]
    fn test_particles_spawn_within_spread() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = ParticleField::new(&mut rng);
        for p in field.particles() {
            for axis in p.position {
                assert!(axis.abs() <= SPREAD);
            }
            assert!((0.0..1.0).contains(&p.scale));
        }
    }

    #[test]
    fn test_advance_only_moves_vertically() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new(&mut rng);
        let before: Vec<[f32; 3]> = field.particles().iter().map(|p| p.position).collect();

        field.advance(1.0, 0.0);

        for (old, new) in before.iter().zip(field.particles()) {
            assert_eq!(old[0], new.position[0]);
            assert_eq!(old[2], new.position[2]);
        }
    }

    #[test]
    fn test_field_rotation_tracks_elapsed_and_pointer() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new(&mut rng);
        field.advance(10.0, -0.3);
        assert!((field.yaw - 0.5).abs() < 1e-6);
        assert!((field.pitch - -0.03).abs() < 1e-6);
    }
}
