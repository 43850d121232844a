use cgmath::{Matrix4, Point3, Transform};
use model_ngin::{
    config::{LightingConfig, ModelDesc},
    data_structures::model::world_transform,
    resources::texture::TextureSource,
};

use crate::common::test_utils::{Call, Recorder, RecordingBackend, camera, fixture};

mod common;

#[test]
fn frame_is_wrapped_in_shader_use_and_binds_per_mesh() {
    let mut backend = RecordingBackend::default();
    let model = backend.load(&ModelDesc::new(fixture("multi.obj")));
    let bricks = model.textures()[0].clone().unwrap();
    let plain = model.textures()[1].clone().unwrap();

    let mut recorder = Recorder::default();
    model.render(&camera(), &mut recorder);

    let uniforms = recorder.uniforms();
    assert_eq!(uniforms.len(), 1);
    assert_eq!(
        recorder.calls,
        vec![
            Call::UseShader,
            Call::Uniforms(uniforms[0]),
            Call::Bind(0, bricks.clone()),
            Call::Draw(0),
            Call::Unbind(0, bricks),
            Call::Bind(0, plain.clone()),
            Call::Draw(1),
            Call::Unbind(0, plain),
            Call::UnuseShader,
        ]
    );
}

#[test]
fn rendering_twice_issues_identical_commands() {
    let mut backend = RecordingBackend::default();
    let model = backend.load(&ModelDesc::new(fixture("triangle.gltf")));
    let camera = camera();

    let mut first = Recorder::default();
    let mut second = Recorder::default();
    model.render(&camera, &mut first);
    model.render(&camera, &mut second);
    assert!(!first.calls.is_empty());
    assert_eq!(first.calls, second.calls);
}

#[test]
fn uniforms_carry_world_camera_and_light() {
    let lighting = LightingConfig::default();
    let desc =
        ModelDesc::new(fixture("coloured.obj")).with_transform([1.0, -1.0, 2.0], [2.0, 2.0, 2.0]);
    let mut backend = RecordingBackend::default();
    let model = backend.load(&desc);
    let camera = camera();

    let mut recorder = Recorder::default();
    model.render(&camera, &mut recorder);
    let uniforms = recorder.uniforms()[0];

    let world: [[f32; 4]; 4] = world_transform([1.0, -1.0, 2.0], [2.0, 2.0, 2.0]).into();
    let view: [[f32; 4]; 4] = camera.view_matrix().into();
    let projection: [[f32; 4]; 4] = camera.projection_matrix().into();
    assert_eq!(uniforms.transform.model, world);
    assert_eq!(uniforms.transform.view, view);
    assert_eq!(uniforms.transform.projection, projection);
    assert_eq!(uniforms.transform.eye_position, [0.0, 1.0, 5.0]);
    assert_eq!(uniforms.light.colour, lighting.directional.colour);
    assert_eq!(uniforms.light.specular_power, lighting.specular.power);
}

#[test]
fn world_transform_scales_then_translates() {
    let world: Matrix4<f32> = world_transform([1.0, 2.0, 3.0], [0.5, 2.0, -1.0]);
    for p in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, -4.0, 8.0),
        Point3::new(-1.0, 1.0, 1.0),
    ] {
        let expected = Point3::new(1.0 + 0.5 * p.x, 2.0 + 2.0 * p.y, 3.0 - p.z);
        assert_eq!(world.transform_point(p), expected);
    }
}

#[test]
fn empty_texture_slot_draws_untextured() {
    let mut backend = RecordingBackend {
        unreadable: vec![TextureSource::Default("textures/default.png".into())],
        ..Default::default()
    };
    let model = backend.load(&ModelDesc::new(fixture("coloured.obj")));

    let mut recorder = Recorder::default();
    model.render(&camera(), &mut recorder);
    assert_eq!(recorder.binds(), 0);
    assert!(!recorder.calls.iter().any(|c| matches!(c, Call::Unbind(..))));
    assert_eq!(recorder.draws(), 1);
}

#[test]
fn dropping_a_model_leaves_the_camera_usable() {
    let camera = camera();
    {
        let mut backend = RecordingBackend::default();
        let model = backend.load(&ModelDesc::new(fixture("coloured.obj")));
        model.render(&camera, &mut Recorder::default());
    }
    assert_eq!(camera.position, Point3::new(0.0, 1.0, 5.0));
}
