// Static hand pose classification from MediaPipe landmarks
//
// Image y grows downward, so a finger is extended when its tip sits above
// (has a smaller y than) its PIP joint.

use crate::models::pose::{GestureLabels, HandLandmark, HandPose, Keypoint3D};

/// Default thumb-tip to index-tip distance below which the hand is pinching
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

/// Tip/PIP pairs for the four non-thumb fingers
const FINGERS: [(HandLandmark, HandLandmark); 4] = [
    (HandLandmark::IndexFingerTip, HandLandmark::IndexFingerPip),
    (HandLandmark::MiddleFingerTip, HandLandmark::MiddleFingerPip),
    (HandLandmark::RingFingerTip, HandLandmark::RingFingerPip),
    (HandLandmark::PinkyTip, HandLandmark::PinkyPip),
];

/// Euclidean distance between two landmarks
pub fn distance(a: &Keypoint3D, b: &Keypoint3D) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Thumb and index tips brought together.
///
/// The threshold is absolute in normalized image space, so it is not
/// invariant to hand size or distance from the camera.
pub fn is_pinching(pose: &HandPose, threshold: f32) -> bool {
    let thumb_tip = pose.landmark(HandLandmark::ThumbTip);
    let index_tip = pose.landmark(HandLandmark::IndexFingerTip);
    distance(thumb_tip, index_tip) < threshold
}

fn is_extended(pose: &HandPose, tip: HandLandmark, pip: HandLandmark) -> bool {
    pose.landmark(tip).y < pose.landmark(pip).y
}

fn is_closed(pose: &HandPose, tip: HandLandmark, pip: HandLandmark) -> bool {
    pose.landmark(tip).y > pose.landmark(pip).y
}

/// Index and middle extended, ring and pinky closed
pub fn is_peace_sign(pose: &HandPose) -> bool {
    let [index, middle, ring, pinky] = FINGERS;

    is_extended(pose, index.0, index.1)
        && is_extended(pose, middle.0, middle.1)
        && is_closed(pose, ring.0, ring.1)
        && is_closed(pose, pinky.0, pinky.1)
}

/// Count extended fingers (0-5).
///
/// The thumb flexes sideways, so it is compared on the x axis against its IP joint.
pub fn count_extended_fingers(pose: &HandPose) -> u8 {
    let thumb_extended =
        pose.landmark(HandLandmark::ThumbTip).x < pose.landmark(HandLandmark::ThumbIp).x;

    let fingers = FINGERS
        .iter()
        .filter(|(tip, pip)| is_extended(pose, *tip, *pip))
        .count() as u8;

    fingers + thumb_extended as u8
}

/// Run every classifier over one pose
pub fn classify(pose: &HandPose, pinch_threshold: f32) -> GestureLabels {
    GestureLabels {
        pinching: is_pinching(pose, pinch_threshold),
        peace_sign: is_peace_sign(pose),
        extended_fingers: count_extended_fingers(pose),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::pose::{Handedness, HAND_LANDMARK_COUNT};

    /// A hand with every finger curled and the thumb tucked in
    pub(crate) fn fist() -> HandPose {
        let mut landmarks = [Keypoint3D::new(0.5, 0.5, 0.0); HAND_LANDMARK_COUNT];
        landmarks[HandLandmark::ThumbIp as usize] = Keypoint3D::new(0.40, 0.60, 0.0);
        landmarks[HandLandmark::ThumbTip as usize] = Keypoint3D::new(0.45, 0.62, 0.0);
        for (i, (tip, pip)) in FINGERS.iter().enumerate() {
            let x = 0.45 + 0.05 * i as f32;
            landmarks[*pip as usize] = Keypoint3D::new(x, 0.50, 0.0);
            landmarks[*tip as usize] = Keypoint3D::new(x, 0.55, 0.0);
        }
        HandPose {
            landmarks,
            handedness: Handedness::Right,
            confidence: 0.9,
        }
    }

    pub(crate) fn set_finger(pose: &mut HandPose, finger: usize, extended: bool) {
        let (tip, pip) = FINGERS[finger];
        let pip_y = pose.landmarks[pip as usize].y;
        pose.landmarks[tip as usize].y = if extended { pip_y - 0.1 } else { pip_y + 0.05 };
    }

    pub(crate) fn set_thumb(pose: &mut HandPose, extended: bool) {
        let ip_x = pose.landmarks[HandLandmark::ThumbIp as usize].x;
        pose.landmarks[HandLandmark::ThumbTip as usize].x =
            if extended { ip_x - 0.05 } else { ip_x + 0.05 };
    }

    pub(crate) fn open_hand() -> HandPose {
        let mut pose = fist();
        set_thumb(&mut pose, true);
        for finger in 0..4 {
            set_finger(&mut pose, finger, true);
        }
        pose
    }

    pub(crate) fn peace_sign() -> HandPose {
        let mut pose = fist();
        set_finger(&mut pose, 0, true);
        set_finger(&mut pose, 1, true);
        pose
    }

    /// Thumb tip moved onto the index tip
    pub(crate) fn pinch() -> HandPose {
        let mut pose = fist();
        let index_tip = pose.landmarks[HandLandmark::IndexFingerTip as usize];
        pose.landmarks[HandLandmark::ThumbTip as usize] =
            Keypoint3D::new(index_tip.x + 0.01, index_tip.y, index_tip.z);
        pose
    }

    fn with_tips_apart(separation: f32) -> HandPose {
        let mut pose = fist();
        pose.landmarks[HandLandmark::IndexFingerTip as usize] = Keypoint3D::new(0.5, 0.5, 0.0);
        pose.landmarks[HandLandmark::ThumbTip as usize] =
            Keypoint3D::new(0.5 + separation, 0.5, 0.0);
        pose
    }

    #[test]
    fn test_distance_is_a_metric() {
        let a = Keypoint3D::new(0.1, 0.2, 0.3);
        let b = Keypoint3D::new(0.4, 0.6, -0.2);

        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &a), 0.0);
        assert!((distance(&Keypoint3D::default(), &Keypoint3D::new(0.3, 0.4, 0.0)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_distance_includes_depth() {
        let a = Keypoint3D::new(0.5, 0.5, 0.0);
        let b = Keypoint3D::new(0.5, 0.5, 0.2);
        assert!((distance(&a, &b) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_threshold_is_strict() {
        // 0.25 and 0.375 are exact in f32, so the boundary comparison is exact.
        assert!(is_pinching(&with_tips_apart(0.0625), 0.25));
        assert!(!is_pinching(&with_tips_apart(0.25), 0.25));
        assert!(!is_pinching(&with_tips_apart(0.375), 0.25));
    }

    #[test]
    fn test_pinch_default_threshold() {
        assert!(is_pinching(&with_tips_apart(0.03), DEFAULT_PINCH_THRESHOLD));
        assert!(!is_pinching(&with_tips_apart(0.08), DEFAULT_PINCH_THRESHOLD));
        assert!(is_pinching(&pinch(), DEFAULT_PINCH_THRESHOLD));
        assert!(!is_pinching(&open_hand(), DEFAULT_PINCH_THRESHOLD));
    }

    #[test]
    fn test_count_extended_fingers_extremes() {
        assert_eq!(count_extended_fingers(&fist()), 0);
        assert_eq!(count_extended_fingers(&open_hand()), 5);
    }

    #[test]
    fn test_count_extended_fingers_thumb_uses_x_axis() {
        let mut pose = fist();
        set_thumb(&mut pose, true);
        assert_eq!(count_extended_fingers(&pose), 1);

        // Raising the thumb tip vertically does not count as extended
        let mut pose = fist();
        pose.landmarks[HandLandmark::ThumbTip as usize].y = 0.1;
        assert_eq!(count_extended_fingers(&pose), 0);
    }

    #[test]
    fn test_peace_sign_only_for_one_combination() {
        for mask in 0u8..16 {
            let mut pose = fist();
            let states = [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0];
            for (finger, extended) in states.iter().enumerate() {
                set_finger(&mut pose, finger, *extended);
            }

            let expected = states == [true, true, false, false];
            assert_eq!(is_peace_sign(&pose), expected, "finger states {:?}", states);
        }
    }

    #[test]
    fn test_peace_sign_requires_strictly_closed_fingers() {
        let mut pose = peace_sign();
        let (tip, pip) = FINGERS[2];
        pose.landmarks[tip as usize].y = pose.landmarks[pip as usize].y;
        assert!(!is_peace_sign(&pose));
    }

    #[test]
    fn test_classify_reports_overlapping_labels() {
        let labels = classify(&peace_sign(), DEFAULT_PINCH_THRESHOLD);
        assert!(labels.peace_sign);
        assert!(!labels.pinching);
        assert_eq!(labels.extended_fingers, 2);
    }
}
