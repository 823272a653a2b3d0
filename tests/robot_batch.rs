use approx::assert_abs_diff_eq;
use armview::*;

fn camera_screen() -> ScreenSpace {
    let rig = CameraRig::new(SphericalView::default());
    ScreenSpace::new(rig.projection_matrix(1.0), rig.view_matrix(), Vec2::new(1024.0, 1024.0))
}

fn projected_vertices(batch: &VertexBatch) -> usize {
    batch
        .vertices()
        .iter()
        .filter(|v| v.shade_mode() == ShadeMode::Projected)
        .count()
}

#[test]
fn drawing_the_arm_fills_the_batch_and_restores_the_stack() {
    let drawer = RobotDrawer::default();
    let mut builder = MeshBuilder::new();
    let screen = camera_screen();

    drawer.draw(
        &mut builder,
        &JointAngles::from_degrees([15.0, 30.0, -20.0, 10.0, 45.0, 90.0]),
        &screen,
    );

    assert_eq!(builder.stack().depth(), 1);
    assert_eq!(builder.stack().current(), Mat4::IDENTITY);

    let batch = builder.batch();
    assert!(!batch.is_empty());
    assert!(batch.indices().len() % 3 == 0);
    assert!(
        batch
            .indices()
            .iter()
            .all(|&i| (i as usize) < batch.vertices().len())
    );

    // Two frames of three axes each, four corners per axis quad.
    assert_eq!(projected_vertices(batch), 6 * 4);
}

fn positions(vertices: &[Vertex3d]) -> Vec<Vec3> {
    vertices.iter().map(|v| Vec3::from(v.position)).collect()
}

/// Center of a tessellated sphere: midpoint of its two poles.
fn sphere_center(vertices: &[Vertex3d]) -> Vec3 {
    let p = positions(vertices);
    (p[0] + p[p.len() - 1]) * 0.5
}

#[test]
fn drawer_emits_base_links_and_tcp_in_order() {
    // Cylinders have 10 slices and 10 stacks: 11 x 11 side vertices, then
    // each cap is a center vertex followed by its ring.
    const SIDE: usize = 11 * 11;
    const BOTTOM_CENTER: usize = SIDE;
    const TOP_CENTER: usize = SIDE + 12;
    const LINKS: [(usize, usize, f32, f32); 4] = [
        (0, 1, 0.05, 0.05),
        (1, 2, 0.05, 0.03),
        (3, 5, 0.03, 0.02),
        (5, 6, 0.02, 0.01),
    ];

    let drawer = RobotDrawer::default();
    let mut builder = MeshBuilder::new();
    let angles = JointAngles::from_degrees([20.0, 35.0, -15.0, 40.0, 60.0, -30.0]);
    let chain = drawer.draw(&mut builder, &angles, &camera_screen());
    let batch = builder.batch();
    let subs = batch.sub_batches();

    let base = positions(batch.sub_batch_vertices(&subs[0]));
    assert_eq!(base.len(), 24);
    assert!(batch.sub_batch_vertices(&subs[0]).iter().all(|v| v.color == BODY_COLOR.to_array()));
    let min = base.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
    let max = base.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);
    assert_abs_diff_eq!(min, Vec3::new(-0.15, -0.12, 0.0), epsilon = 1e-6);
    assert_abs_diff_eq!(max, Vec3::new(0.15, 0.12, 0.09), epsilon = 1e-6);

    let p = &chain.positions;
    for (link, &(from, to, base_radius, top_radius)) in LINKS.iter().enumerate() {
        let cylinder = batch.sub_batch_vertices(&subs[1 + 2 * link]);
        assert!(cylinder.iter().all(|v| v.color == LINK_COLOR.to_array()));
        let c = positions(cylinder);
        assert_abs_diff_eq!(c[BOTTOM_CENTER], p[from], epsilon = 1e-5);
        assert_abs_diff_eq!(c[TOP_CENTER], p[to], epsilon = 1e-5);
        assert_abs_diff_eq!(c[BOTTOM_CENTER + 1].distance(c[BOTTOM_CENTER]), base_radius, epsilon = 1e-5);
        assert_abs_diff_eq!(c[TOP_CENTER + 1].distance(c[TOP_CENTER]), top_radius, epsilon = 1e-5);

        let sphere = batch.sub_batch_vertices(&subs[2 + 2 * link]);
        assert!(sphere.iter().all(|v| v.color == BODY_COLOR.to_array()));
        let offset = if link == 0 { 0.05 } else { 0.0 };
        let expected = p[from] + (p[to] - p[from]).normalize() * offset;
        assert_abs_diff_eq!(sphere_center(sphere), expected, epsilon = 1e-5);
    }

    let tcp = batch.sub_batch_vertices(&subs[9]);
    assert_abs_diff_eq!(sphere_center(tcp), chain.tcp_position(), epsilon = 1e-5);
    assert_abs_diff_eq!(positions(tcp)[0].distance(chain.tcp_position()), 0.011, epsilon = 1e-5);

    // Everything after the TCP sphere is frame axis lines.
    assert!(
        subs[10..]
            .iter()
            .all(|sub| batch.sub_batch_vertices(sub).iter().all(|v| v.shade_mode() == ShadeMode::Projected))
    );
}

#[test]
fn full_frame_contains_floor_bulbs_and_workspace() {
    let drawer = RobotDrawer::default();
    let mut builder = MeshBuilder::new();
    let screen = camera_screen();
    let lighting = ViewerConfig::default().lighting();

    build_frame(&mut builder, &drawer, &JointAngles::default(), &lighting, &screen);
    let first_len = builder.batch().vertices().len();

    // Frames plus the 12 workspace edges.
    assert_eq!(projected_vertices(builder.batch()), (6 + 12) * 4);

    let bulb_color = lighting.lights()[0].color.to_array();
    assert!(
        builder
            .batch()
            .vertices()
            .iter()
            .any(|v| v.shade_mode() == ShadeMode::Unlit && v.color == bulb_color)
    );

    // Rebuilding starts from an empty batch.
    build_frame(&mut builder, &drawer, &JointAngles::default(), &lighting, &screen);
    assert_eq!(builder.batch().vertices().len(), first_len);
    assert_eq!(builder.stack().depth(), 1);
}

#[test]
fn disabled_lights_get_no_bulb() {
    let drawer = RobotDrawer::default();
    let screen = camera_screen();

    let mut lit = MeshBuilder::new();
    let lighting = ViewerConfig::default().lighting();
    build_frame(&mut lit, &drawer, &JointAngles::default(), &lighting, &screen);

    let mut dark = MeshBuilder::new();
    let mut lighting = lighting.clone();
    for light in lighting.lights_mut() {
        light.enabled = false;
    }
    build_frame(&mut dark, &drawer, &JointAngles::default(), &lighting, &screen);

    assert!(dark.batch().vertices().len() < lit.batch().vertices().len());
}

#[test]
fn configured_robot_draws_with_its_own_table() {
    let mut toml = String::from("[workspace]\nmin = [-500.0, -500.0, 0.0]\nmax = [500.0, 500.0, 1000.0]\n[dh]\njoints = [\n");
    for _ in 0..JOINT_COUNT {
        toml.push_str("  { a = 0.0, alpha = 0.0, d = 0.1 },\n");
    }
    toml.push_str("]\n");
    let config = ViewerConfig::from_toml_str(&toml).unwrap();

    let drawer = RobotDrawer::new(Kinematics::new(config.dh_table()), config.workspace.to_workspace());
    let chain = drawer.kinematics().forward(&JointAngles::default());
    assert!((chain.positions[JOINT_COUNT].z - 0.6).abs() < 1e-5);

    let corners = drawer.workspace().corners();
    assert!((corners[0].x + 0.5).abs() < 1e-6);
    assert!((corners[6].z - 1.0).abs() < 1e-6);

    let mut builder = MeshBuilder::new();
    drawer.draw(&mut builder, &JointAngles::default(), &camera_screen());
    assert!(!builder.batch().is_empty());
}
