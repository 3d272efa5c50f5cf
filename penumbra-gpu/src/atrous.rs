use glam::{ivec2, IVec2, UVec2, Vec3, Vec4, Vec4Swizzles};

use crate::{AtrousPassParams, Camera, F32Ext, Surface};

/// Single iteration of the edge-aware à-trous wavelet filter.
///
/// See:
/// - https://jo.dreggn.org/home/2010_atrous.pdf
///   (Edge-Avoiding À-Trous Wavelet Transform for fast Global Illumination
///   Filtering by Dammertz et al.)
pub struct AtrousFilter<'a> {
    pub camera: &'a Camera,
    pub params: &'a AtrousPassParams,
}

impl<'a> AtrousFilter<'a> {
    /// Returns the weight of a neighbour located `offset` kernel-taps away
    /// from the center.
    pub fn weight(
        &self,
        center: &Surface,
        center_luma: f32,
        sample: &Surface,
        sample_luma: f32,
        offset: IVec2,
    ) -> f32 {
        let radius = self.params.radius.max(1) as f32;

        let w_spatial =
            (-(offset.length_squared() as f32) / (2.0 * radius.sqr())).exp();

        let w_depth = (-(center.depth - sample.depth).abs()
            / self.params.sigma_depth)
            .exp();

        let w_normal = center
            .normal
            .dot(sample.normal)
            .max(0.0)
            .powf(self.params.phi_normal);

        let w_value =
            (-(center_luma - sample_luma).abs() / self.params.phi_value).exp();

        w_spatial
            * (w_depth * w_normal * w_value).powf(self.params.sharpen_power)
    }

    /// Filters pixel at `screen_pos`; `sample` reads this iteration's source
    /// (value + variance) together with the G-buffer.
    pub fn run(
        &self,
        screen_pos: UVec2,
        sample: impl Fn(UVec2) -> (Vec4, Surface),
    ) -> Vec4 {
        let (center, surface) = sample(screen_pos);

        if surface.is_sky() {
            return center;
        }

        let signal = self.params.signal();

        if signal.is_radiance()
            && surface.roughness < self.params.mirror_roughness
        {
            return center;
        }

        let center_luma = signal.luminance(center.xyz());
        let radius = self.params.radius as i32;
        let step = self.params.step.max(1) as i32;

        let mut value_sum = Vec3::ZERO;
        let mut variance_sum: f32 = 0.0;
        let mut weight_sum: f32 = 0.0;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let offset = ivec2(dx, dy);
                let pos = screen_pos.as_ivec2() + offset * step;

                if !self.camera.contains(pos) {
                    continue;
                }

                let (value, sample_surface) = sample(pos.as_uvec2());

                if sample_surface.is_sky() {
                    continue;
                }

                let weight = self.weight(
                    &surface,
                    center_luma,
                    &sample_surface,
                    signal.luminance(value.xyz()),
                    offset,
                );

                value_sum += value.xyz() * weight;
                variance_sum += weight.sqr() * value.w;
                weight_sum += weight;
            }
        }

        if weight_sum <= 0.0 {
            return center;
        }

        (value_sum / weight_sum).extend(variance_sum / weight_sum.sqr())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, vec4, Mat4};

    use super::*;

    fn camera() -> Camera {
        Camera {
            curr_ndc_to_world: Mat4::IDENTITY,
            prev_world_to_clip: Mat4::IDENTITY,
            screen: vec4(16.0, 16.0, 0.0, 0.0),
            ..Default::default()
        }
    }

    fn params() -> AtrousPassParams {
        AtrousPassParams {
            radius: 1,
            step: 1,
            sigma_depth: 1.0,
            phi_value: 10.0,
            phi_normal: 32.0,
            sharpen_power: 1.0,
            mirror_roughness: 0.0,
            flags: 0,
        }
    }

    fn surface(depth: f32) -> Surface {
        Surface {
            normal: Vec3::Z,
            depth,
            ..Default::default()
        }
    }

    #[test]
    fn identical_neighbour_gets_full_weight() {
        let camera = camera();
        let params = params();
        let target = AtrousFilter {
            camera: &camera,
            params: &params,
        };

        let actual = target.weight(
            &surface(10.0),
            0.5,
            &surface(10.0),
            0.5,
            IVec2::ZERO,
        );

        assert_eq!(1.0, actual);
    }

    #[test]
    fn discontinuities_attenuate() {
        let camera = camera();
        let params = params();
        let target = AtrousFilter {
            camera: &camera,
            params: &params,
        };

        let w_near = target.weight(
            &surface(10.0),
            0.5,
            &surface(10.0),
            0.5,
            ivec2(1, 0),
        );

        let w_far = target.weight(
            &surface(10.0),
            0.5,
            &surface(15.0),
            0.5,
            ivec2(1, 0),
        );

        let w_flipped = target.weight(
            &surface(10.0),
            0.5,
            &Surface {
                normal: -Vec3::Z,
                ..surface(10.0)
            },
            0.5,
            ivec2(1, 0),
        );

        assert!(w_far < w_near * 0.01);
        assert_eq!(0.0, w_flipped);
    }

    #[test]
    fn sharpening_attenuates_edges_further() {
        let camera = camera();
        let params = params();
        let sharpened = AtrousPassParams {
            sharpen_power: 2.0,
            ..params
        };

        let w = |params: &AtrousPassParams| {
            AtrousFilter {
                camera: &camera,
                params,
            }
            .weight(&surface(10.0), 0.5, &surface(10.5), 0.5, IVec2::ZERO)
        };

        assert!(w(&sharpened) < w(&params));
    }

    #[test]
    fn flat_image_keeps_value_and_loses_variance() {
        let camera = camera();
        let params = params();
        let target = AtrousFilter {
            camera: &camera,
            params: &params,
        };

        let actual = target
            .run(uvec2(4, 4), |_| (vec4(0.5, 0.5, 0.5, 0.1), surface(10.0)));

        assert_relative_eq!(0.5, actual.x, epsilon = 1e-6);
        assert!(actual.w < 0.1);
    }

    #[test]
    fn mirrors_are_not_filtered() {
        let camera = camera();
        let params = AtrousPassParams {
            mirror_roughness: 0.05,
            flags: AtrousPassParams::RADIANCE,
            ..params()
        };

        let target = AtrousFilter {
            camera: &camera,
            params: &params,
        };

        let actual = target.run(uvec2(4, 4), |pos| {
            let value = if pos == uvec2(4, 4) {
                vec3(1.0, 0.0, 0.0)
            } else {
                Vec3::ZERO
            };

            (value.extend(0.0), surface(10.0))
        });

        assert_eq!(vec4(1.0, 0.0, 0.0, 0.0), actual);
    }
}
