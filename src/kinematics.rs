//! Denavit–Hartenberg forward kinematics for a 6-axis arm.
//!
//! Joint angles come in the arm's native convention (see
//! [`JointAngles::to_dh_convention`]) and are turned into one homogeneous
//! transform per joint. Chaining the transforms from the base yields the
//! seven points the drawer connects: the base origin, the origins of joints
//! 1 to 5, and the tool-center-point (TCP).

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Number of revolute joints.
pub const JOINT_COUNT: usize = 6;

/// DH parameters of one joint. Lengths in metres, angles in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DhJoint {
    /// Link length along the rotated x axis.
    pub a: f32,
    /// Twist about the rotated x axis.
    pub alpha: f32,
    /// Offset along the previous z axis.
    pub d: f32,
}

impl DhJoint {
    pub const fn new(a: f32, alpha: f32, d: f32) -> Self {
        Self { a, alpha, d }
    }
}

/// DH parameters for all six joints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DhTable {
    pub joints: [DhJoint; JOINT_COUNT],
}

impl Default for DhTable {
    /// A compact six-axis industrial arm.
    fn default() -> Self {
        Self {
            joints: [
                DhJoint::new(0.070, -FRAC_PI_2, 0.352),
                DhJoint::new(0.360, 0.0, 0.0),
                DhJoint::new(0.0, FRAC_PI_2, 0.0),
                DhJoint::new(0.0, FRAC_PI_2, 0.380),
                DhJoint::new(0.0, FRAC_PI_2, 0.0),
                DhJoint::new(0.0, 0.0, 0.065),
            ],
        }
    }
}

impl DhTable {
    /// Transform from frame `joint + 1` to frame `joint` for the DH angle `theta`.
    ///
    /// `joint` is zero-based. Equivalent to
    /// `Rz(theta) · Tz(d) · Tx(a) · Rx(alpha)`.
    ///
    /// # Panics
    ///
    /// Panics if `joint >= JOINT_COUNT`.
    pub fn joint_transform(&self, joint: usize, theta: f32) -> Mat4 {
        let DhJoint { a, alpha, d } = self.joints[joint];
        let (st, ct) = theta.sin_cos();
        let (sa, ca) = alpha.sin_cos();

        Mat4::from_cols(
            Vec4::new(ct, st, 0.0, 0.0),
            Vec4::new(-st * ca, ct * ca, sa, 0.0),
            Vec4::new(st * sa, -ct * sa, ca, 0.0),
            Vec4::new(a * ct, a * st, d, 1.0),
        )
    }
}

/// Six joint angles in radians, in the arm's native convention.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointAngles(pub [f32; JOINT_COUNT]);

impl JointAngles {
    pub fn from_degrees(degrees: [f32; JOINT_COUNT]) -> Self {
        Self(degrees.map(f32::to_radians))
    }

    /// Maps native angles to the angles the DH chain expects.
    ///
    /// Joint 3 is measured against the horizontal plane, so its DH angle
    /// depends on the native angle of joint 2. All outputs are computed from
    /// the unmodified input.
    pub fn to_dh_convention(&self) -> [f32; JOINT_COUNT] {
        let [t1, t2, t3, t4, t5, t6] = self.0;
        [t1, t2 - FRAC_PI_2, t3 + PI - t2, t4, -(t5 + PI), t6 - PI]
    }
}

impl From<[f32; JOINT_COUNT]> for JointAngles {
    fn from(radians: [f32; JOINT_COUNT]) -> Self {
        Self(radians)
    }
}

/// Result of one forward-kinematics evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointChain {
    /// `H_n` for each joint, frame `n` to frame `n - 1`.
    pub transforms: [Mat4; JOINT_COUNT],
    /// Cumulative products `H_1 · … · H_n`; `frames[5]` is the TCP pose.
    pub frames: [Mat4; JOINT_COUNT],
    /// Base origin followed by the origin of every frame.
    pub positions: [Vec3; JOINT_COUNT + 1],
}

impl JointChain {
    /// Pose of the tool-center-point in base coordinates.
    pub fn tcp(&self) -> Mat4 {
        self.frames[JOINT_COUNT - 1]
    }

    pub fn tcp_position(&self) -> Vec3 {
        self.positions[JOINT_COUNT]
    }
}

/// Forward kinematics over a fixed [`DhTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    dh: DhTable,
}

impl Kinematics {
    pub fn new(dh: DhTable) -> Self {
        Self { dh }
    }

    pub fn dh(&self) -> &DhTable {
        &self.dh
    }

    /// Computes every joint transform and position for `angles`.
    pub fn forward(&self, angles: &JointAngles) -> JointChain {
        let thetas = angles.to_dh_convention();

        let transforms: [Mat4; JOINT_COUNT] =
            std::array::from_fn(|joint| self.dh.joint_transform(joint, thetas[joint]));

        let mut frames = [Mat4::IDENTITY; JOINT_COUNT];
        let mut positions = [Vec3::ZERO; JOINT_COUNT + 1];
        let mut cumulative = Mat4::IDENTITY;
        for (joint, transform) in transforms.iter().enumerate() {
            cumulative *= *transform;
            frames[joint] = cumulative;
            positions[joint + 1] = cumulative.transform_point3(Vec3::ZERO);
        }

        JointChain {
            transforms,
            frames,
            positions,
        }
    }
}
