/// Display window over intensity values, described by level (center) and width.
///
/// Windows are immutable; build a new one to change the parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// Returns `None` unless `level` is finite and `width` is strictly positive.
    pub fn new(level: f32, width: f32) -> Option<CtWindow> {
        if level.is_finite() && width.is_finite() && width > 0.0 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// Window spanning `[min, max]`. A flat range gets a width of one.
    pub fn from_range(min: f32, max: f32) -> Option<CtWindow> {
        if !min.is_finite() || !max.is_finite() || max < min {
            return None;
        }
        let width = (max - min).max(1.0);
        Self::new(min + (max - min) / 2.0, width)
    }

    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Gray value (0..=255) for `value` under this window, `None` for NaN or infinity.
    pub fn eval(&self, value: f32) -> Option<u8> {
        if !value.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if value <= lb {
            Some(u8::MIN)
        } else if value >= self.upper_bound() {
            Some(u8::MAX)
        } else {
            Some((((value - lb) / self.width) * 255.0) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_parameters() {
        assert!(CtWindow::new(0.0, 0.0).is_none());
        assert!(CtWindow::new(f32::NAN, 10.0).is_none());
        assert!(CtWindow::from_range(5.0, 1.0).is_none());
    }

    #[test]
    fn clamps_outside_window() {
        let window = CtWindow::new(0.0, 200.0).unwrap();
        assert_eq!(window.eval(-500.0), Some(0));
        assert_eq!(window.eval(500.0), Some(255));
        assert_eq!(window.eval(0.0), Some(127));
        assert_eq!(window.eval(f32::INFINITY), None);
    }

    #[test]
    fn range_window_covers_range() {
        let window = CtWindow::from_range(-1024.0, 3000.0).unwrap();
        assert_eq!(window.lower_bound(), -1024.0);
        assert_eq!(window.upper_bound(), 3000.0);

        let flat = CtWindow::from_range(7.0, 7.0).unwrap();
        assert_eq!(flat.width(), 1.0);
    }
}
