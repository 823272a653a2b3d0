use std::f32::consts::{FRAC_PI_2, PI};

use approx::assert_abs_diff_eq;
use armview::{JOINT_COUNT, JointAngles, Kinematics, Mat3, Mat4, Vec3};

#[test]
fn home_tcp_pose() {
    let chain = Kinematics::default().forward(&JointAngles::default());

    assert_eq!(chain.positions[0], Vec3::ZERO);
    assert_abs_diff_eq!(chain.tcp_position(), Vec3::new(0.515, 0.0, 0.712), epsilon = 1e-5);

    // Tool z points along base x, tool x points down.
    let rotation = Mat3::from_mat4(chain.tcp());
    assert_abs_diff_eq!(rotation.x_axis, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    assert_abs_diff_eq!(rotation.y_axis, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    assert_abs_diff_eq!(rotation.z_axis, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn first_joint_rotates_the_whole_arm_about_base_z() {
    let kinematics = Kinematics::default();
    let home = kinematics.forward(&JointAngles::default());
    let turned = kinematics.forward(&JointAngles([FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, 0.0]));

    let rz = Mat4::from_rotation_z(FRAC_PI_2);
    for (a, b) in home.positions.iter().zip(turned.positions.iter()) {
        assert_abs_diff_eq!(rz.transform_point3(*a), *b, epsilon = 1e-5);
    }
    // Height of every joint is unchanged.
    for (a, b) in home.positions.iter().zip(turned.positions.iter()) {
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-6);
    }
}

#[test]
fn chain_is_consistent_for_arbitrary_angles() {
    let kinematics = Kinematics::default();
    let samples = [
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [30.0, -45.0, 60.0, 90.0, -120.0, 180.0],
        [-180.0, 180.0, -90.0, 45.0, 10.0, -5.0],
    ];
    for degrees in samples {
        let chain = kinematics.forward(&JointAngles::from_degrees(degrees));
        let thetas = JointAngles::from_degrees(degrees).to_dh_convention();

        let mut product = Mat4::IDENTITY;
        for joint in 0..JOINT_COUNT {
            product *= kinematics.dh().joint_transform(joint, thetas[joint]);
            assert_abs_diff_eq!(chain.positions[joint + 1], product.transform_point3(Vec3::ZERO), epsilon = 1e-5);
        }
        assert_abs_diff_eq!(chain.tcp(), product, epsilon = 1e-5);
    }
}

#[test]
fn wrist_angles_do_not_move_the_wrist_center() {
    let kinematics = Kinematics::default();
    let a = kinematics.forward(&JointAngles::from_degrees([10.0, 20.0, 30.0, 0.0, 0.0, 0.0]));
    let b = kinematics.forward(&JointAngles::from_degrees([10.0, 20.0, 30.0, 70.0, -40.0, 90.0]));
    // Joint 5 origin is the wrist center.
    assert_abs_diff_eq!(a.positions[5], b.positions[5], epsilon = 1e-5);
    assert!(a.tcp_position().distance(b.tcp_position()) > 1e-3);
}

#[test]
fn remap_reference_set() {
    let remapped = JointAngles::default().to_dh_convention();
    let expected = [0.0, -FRAC_PI_2, PI, 0.0, -PI, -PI];
    for (got, want) in remapped.into_iter().zip(expected) {
        assert_abs_diff_eq!(got, want, epsilon = 1e-6);
    }
}
