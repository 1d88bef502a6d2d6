use std::fmt;

/// The five object classes the detector is trained on.
///
/// Discriminants are the model's class ids. The mapping is a fixed contract
/// with the trained model: ids outside `0..=4` never denote a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FishPart {
    Head = 0,
    Body = 1,
    Fish = 2,
    Mouth = 3,
    Finger = 4,
}

impl FishPart {
    /// Order in which parts appear in a position report.
    pub const REPORT_ORDER: [FishPart; 5] = [
        FishPart::Fish,
        FishPart::Head,
        FishPart::Body,
        FishPart::Mouth,
        FishPart::Finger,
    ];

    pub fn from_class_id(class_id: u32) -> Option<Self> {
        match class_id {
            0 => Some(FishPart::Head),
            1 => Some(FishPart::Body),
            2 => Some(FishPart::Fish),
            3 => Some(FishPart::Mouth),
            4 => Some(FishPart::Finger),
            _ => None,
        }
    }

    pub fn class_id(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            FishPart::Head => "Head",
            FishPart::Body => "Body",
            FishPart::Fish => "Fish",
            FishPart::Mouth => "Mouth",
            FishPart::Finger => "Finger",
        }
    }
}

impl fmt::Display for FishPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, FishPart::Head)]
    #[case(1, FishPart::Body)]
    #[case(2, FishPart::Fish)]
    #[case(3, FishPart::Mouth)]
    #[case(4, FishPart::Finger)]
    fn test_class_id_mapping(#[case] id: u32, #[case] part: FishPart) {
        assert_eq!(FishPart::from_class_id(id), Some(part));
        assert_eq!(part.class_id(), id);
    }

    #[rstest]
    #[case(5)]
    #[case(99)]
    #[case(u32::MAX)]
    fn test_unknown_class_ids(#[case] id: u32) {
        assert_eq!(FishPart::from_class_id(id), None);
    }

    #[test]
    fn test_report_order_covers_every_part_once() {
        let mut ids: Vec<u32> = FishPart::REPORT_ORDER.iter().map(|p| p.class_id()).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(FishPart::REPORT_ORDER[0], FishPart::Fish);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(FishPart::Mouth.to_string(), "Mouth");
    }
}
