//! Region of interest handling for the 16x16 SPAD array.
//!
//! The sensor addresses its receiving array as a 16x16 grid with the origin in
//! the bottom-left corner, so the y axis grows upwards and a user ROI is given
//! as a top-left and a bottom-right corner with `top_left_y > bot_right_y`.

/// Number of SPADs per axis of the receiving array.
pub const GRID_SIZE: u8 = 16;

/// Smallest ROI edge the sensor accepts.
pub const MIN_ROI_SIZE: u8 = 4;

const MAX_COORDINATE: u8 = GRID_SIZE - 1;

/// A rectangular window on the SPAD grid used for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Roi {
    /// Column of the top-left corner (0-15)
    pub top_left_x: u8,
    /// Row of the top-left corner (0-15)
    pub top_left_y: u8,
    /// Column of the bottom-right corner (0-15)
    pub bot_right_x: u8,
    /// Row of the bottom-right corner (0-15)
    pub bot_right_y: u8,
}

impl Roi {
    /// Creates an ROI from its corners.
    ///
    /// Returns `None` when a coordinate is outside the grid or the top-left
    /// corner is not strictly above and left of the bottom-right corner.
    #[must_use]
    pub fn new(top_left_x: u8, top_left_y: u8, bot_right_x: u8, bot_right_y: u8) -> Option<Self> {
        let roi = Self {
            top_left_x,
            top_left_y,
            bot_right_x,
            bot_right_y,
        };
        roi.is_valid().then_some(roi)
    }

    /// Builds a `width` x `height` ROI around the given optical center.
    ///
    /// The center SPAD is the one just right of and above the geometric middle
    /// for even sizes, which matches how the sensor places its default 16x16
    /// window around SPAD 199.
    ///
    /// Returns `None` when the size is outside 4..=16 or the window would
    /// leave the grid.
    #[must_use]
    pub fn centered(center: OpticalCenter, width: u8, height: u8) -> Option<Self> {
        let valid_size = MIN_ROI_SIZE..=GRID_SIZE;
        if !valid_size.contains(&width) || !valid_size.contains(&height) {
            return None;
        }

        let (x, y) = center.coordinates();
        let top_left_x = x.checked_sub(width / 2)?;
        let bot_right_y = y.checked_sub(height / 2)?;
        Self::new(
            top_left_x,
            bot_right_y + height - 1,
            top_left_x + width - 1,
            bot_right_y,
        )
    }

    /// Width of the window in SPADs.
    #[must_use]
    pub fn width(&self) -> u8 {
        self.bot_right_x.saturating_sub(self.top_left_x) + 1
    }

    /// Height of the window in SPADs.
    #[must_use]
    pub fn height(&self) -> u8 {
        self.top_left_y.saturating_sub(self.bot_right_y) + 1
    }

    /// Checks the grid bounds and corner ordering.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.top_left_y <= MAX_COORDINATE
            && self.bot_right_x <= MAX_COORDINATE
            && self.top_left_x < self.bot_right_x
            && self.top_left_y > self.bot_right_y
    }
}

/// The SPAD number the sensor uses to name the center of a zone.
///
/// SPADs are numbered column-wise in two halves: 0-127 cover the bottom half
/// of the grid (counted from the right-most column), 128-255 the top half
/// (counted from the left-most column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OpticalCenter(pub u8);

impl OpticalCenter {
    /// Returns the SPAD grid coordinates `(x, y)` of the center.
    #[must_use]
    pub fn coordinates(self) -> (u8, u8) {
        let spad = self.0;
        if spad >= 128 {
            let offset = spad - 128;
            (offset >> 3, MAX_COORDINATE - (offset & 0x07))
        } else {
            (MAX_COORDINATE - (spad >> 3), spad & 0x07)
        }
    }

    /// Returns the center located at grid coordinates `(x, y)`, if inside the grid.
    #[must_use]
    pub fn from_coordinates(x: u8, y: u8) -> Option<Self> {
        if x > MAX_COORDINATE || y > MAX_COORDINATE {
            return None;
        }
        let spad = if y > 7 {
            128 + (x << 3) + (MAX_COORDINATE - y)
        } else {
            ((MAX_COORDINATE - x) << 3) + y
        };
        Some(Self(spad))
    }
}

impl From<u8> for OpticalCenter {
    fn from(spad: u8) -> Self {
        Self(spad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optical_center_decodes_both_halves() {
        assert_eq!(OpticalCenter(199).coordinates(), (8, 8));
        assert_eq!(OpticalCenter(167).coordinates(), (4, 8));
        assert_eq!(OpticalCenter(231).coordinates(), (12, 8));
        assert_eq!(OpticalCenter(0).coordinates(), (15, 0));
        assert_eq!(OpticalCenter(127).coordinates(), (0, 7));
    }

    #[test]
    fn optical_center_coordinates_are_consistent() {
        for spad in 0..=u8::MAX {
            let (x, y) = OpticalCenter(spad).coordinates();
            assert_eq!(OpticalCenter::from_coordinates(x, y), Some(OpticalCenter(spad)));
        }
        assert_eq!(OpticalCenter::from_coordinates(16, 0), None);
    }

    #[test]
    fn default_window_covers_the_whole_grid() {
        let roi = Roi::centered(OpticalCenter(199), 16, 16).unwrap();
        assert_eq!(roi, Roi::new(0, 15, 15, 0).unwrap());
        assert_eq!((roi.width(), roi.height()), (16, 16));
    }

    #[test]
    fn people_counting_zones_split_the_grid() {
        let left = Roi::centered(OpticalCenter(167), 8, 16).unwrap();
        let right = Roi::centered(OpticalCenter(231), 8, 16).unwrap();
        assert_eq!(left, Roi::new(0, 15, 7, 0).unwrap());
        assert_eq!(right, Roi::new(8, 15, 15, 0).unwrap());
    }

    #[test]
    fn centered_rejects_windows_leaving_the_grid() {
        // center (15, 0)
        assert_eq!(Roi::centered(OpticalCenter(0), 8, 8), None);
        // center (4, 8) with a 10 wide window would need x = -1
        assert_eq!(Roi::centered(OpticalCenter(167), 10, 8), None);
        // center (12, 8) with a 16 wide window would end at x = 19
        assert_eq!(Roi::centered(OpticalCenter(231), 16, 4), None);
    }

    #[test]
    fn centered_rejects_bad_sizes() {
        assert_eq!(Roi::centered(OpticalCenter(199), 3, 8), None);
        assert_eq!(Roi::centered(OpticalCenter(199), 8, 17), None);
    }

    #[test]
    fn corners_must_be_ordered() {
        assert!(Roi::new(0, 15, 15, 0).is_some());
        assert!(Roi::new(4, 4, 4, 0).is_none());
        assert!(Roi::new(0, 4, 8, 4).is_none());
        assert!(Roi::new(8, 0, 0, 15).is_none());
        assert!(Roi::new(0, 16, 15, 0).is_none());
    }
}
